//! # Schema Capability
//!
//! The schema engine that defines document shape lives outside this crate.
//! The editor only needs two read-only hooks from it:
//!
//! - `transform`: normalize the raw document for output (e.g. drop UI-only
//!   annotations) before it is stringified
//! - `prepare_import`: adapt a freshly parsed value before it replaces the
//!   document

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SchemaError(pub String);

/// Information handed to the schema on export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformContext {
    /// Name of the document being exported
    pub name: String,

    /// Target format id
    pub format: String,
}

pub trait Schema {
    fn transform(&self, value: &Value, context: &TransformContext) -> Result<Value, SchemaError>;

    fn prepare_import(&self, value: Value) -> Value {
        value
    }
}

/// Exports the document as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySchema;

impl Schema for IdentitySchema {
    fn transform(&self, value: &Value, _context: &TransformContext) -> Result<Value, SchemaError> {
        Ok(value.clone())
    }
}

/// Drops map keys that start with a prefix, at any depth
#[derive(Debug, Clone)]
pub struct StripAnnotations {
    prefix: String,
}

impl StripAnnotations {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn strip(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(key, _)| !key.starts_with(&self.prefix))
                    .map(|(key, value)| (key.clone(), self.strip(value)))
                    .collect::<Map<String, Value>>(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|item| self.strip(item)).collect()),
            other => other.clone(),
        }
    }
}

impl Default for StripAnnotations {
    fn default() -> Self {
        Self::new("__")
    }
}

impl Schema for StripAnnotations {
    fn transform(&self, value: &Value, _context: &TransformContext) -> Result<Value, SchemaError> {
        if self.prefix.is_empty() {
            return Err(SchemaError("annotation prefix must not be empty".to_string()));
        }
        Ok(self.strip(value))
    }
}
