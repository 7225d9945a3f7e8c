//! # Codec Registry
//!
//! Strategy map from format id to codec. Adding a format only requires a
//! [`Codec`] implementation (or two functions via [`from_fns`]).

use crate::{CodecError, Indentation, JsonCodec, YamlCodec};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Parse/stringify pair for one text format
///
/// Implementations must be pure: `stringify` is deterministic for identical
/// inputs and `parse` touches no external state. Errors are plain messages;
/// the registry attaches the format id.
pub trait Codec: Send + Sync {
    fn parse(&self, text: &str) -> Result<Value, String>;

    fn stringify(&self, value: &Value, indentation: Indentation) -> Result<String, String>;
}

/// Codec built from two plain functions
pub struct FnCodec<P, S> {
    parse: P,
    stringify: S,
}

impl<P, S> Codec for FnCodec<P, S>
where
    P: Fn(&str) -> Result<Value, String> + Send + Sync,
    S: Fn(&Value, Indentation) -> Result<String, String> + Send + Sync,
{
    fn parse(&self, text: &str) -> Result<Value, String> {
        (self.parse)(text)
    }

    fn stringify(&self, value: &Value, indentation: Indentation) -> Result<String, String> {
        (self.stringify)(value, indentation)
    }
}

/// Build a codec from a parse function and a stringify function
pub fn from_fns<P, S>(parse: P, stringify: S) -> FnCodec<P, S>
where
    P: Fn(&str) -> Result<Value, String> + Send + Sync,
    S: Fn(&Value, Indentation) -> Result<String, String> + Send + Sync,
{
    FnCodec { parse, stringify }
}

/// Registered codecs, in registration order
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: Vec<(String, Arc<dyn Codec>)>,
}

impl CodecRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `json` and `yaml`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("json", JsonCodec);
        registry.register("yaml", YamlCodec);
        registry
    }

    /// Add a codec, replacing any codec already registered under `format`
    pub fn register(&mut self, format: impl Into<String>, codec: impl Codec + 'static) -> &mut Self {
        let format = format.into();
        let codec: Arc<dyn Codec> = Arc::new(codec);

        match self.codecs.iter_mut().find(|(id, _)| *id == format) {
            Some(entry) => entry.1 = codec,
            None => self.codecs.push((format, codec)),
        }

        self
    }

    pub fn get(&self, format: &str) -> Option<&dyn Codec> {
        self.codecs
            .iter()
            .find(|(id, _)| id == format)
            .map(|(_, codec)| codec.as_ref())
    }

    pub fn contains(&self, format: &str) -> bool {
        self.get(format).is_some()
    }

    /// Registered format ids, in registration order
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.codecs.iter().map(|(id, _)| id.as_str())
    }

    pub fn parse(&self, format: &str, text: &str) -> Result<Value, CodecError> {
        let codec = self.lookup(format)?;
        debug!(format, len = text.len(), "Parsing text");

        codec.parse(text).map_err(|message| CodecError::Parse {
            format: format.to_string(),
            message,
        })
    }

    pub fn stringify(
        &self,
        format: &str,
        value: &Value,
        indentation: Indentation,
    ) -> Result<String, CodecError> {
        let codec = self.lookup(format)?;
        debug!(format, indentation = %indentation, "Stringifying value");

        codec
            .stringify(value, indentation)
            .map_err(|message| CodecError::Stringify {
                format: format.to_string(),
                message,
            })
    }

    fn lookup(&self, format: &str) -> Result<&dyn Codec, CodecError> {
        self.get(format)
            .ok_or_else(|| CodecError::UnknownFormat(format.to_string()))
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.formats()).finish()
    }
}
