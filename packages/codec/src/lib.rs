//! # Docsync Codecs
//!
//! Text codecs for structured configuration documents.
//!
//! A codec is a parse/stringify pair for one text format. Codecs are
//! stateless and keyed by a format id (`"json"`, `"yaml"`) in a
//! [`CodecRegistry`]; nothing outside the registry branches on format
//! identity.
//!
//! ```text
//! ┌──────────────┐  stringify(value, indentation)  ┌──────────┐
//! │ serde_json:: │ ──────────────────────────────→ │   text   │
//! │    Value     │ ←────────────────────────────── │          │
//! └──────────────┘            parse(text)          └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use docsync_codec::{CodecRegistry, Indentation};
//! use serde_json::json;
//!
//! let codecs = CodecRegistry::with_defaults();
//! let value = json!({ "a": 1, "b": [true, null] });
//!
//! let text = codecs.stringify("yaml", &value, Indentation::Minified).unwrap();
//! assert_eq!(text, "{a: 1, b: [true, null]}");
//!
//! let parsed = codecs.parse("yaml", &text).unwrap();
//! assert_eq!(parsed, value);
//! ```

mod error;
mod indentation;
mod json;
mod registry;
mod yaml;

pub use error::CodecError;
pub use indentation::Indentation;
pub use json::{strip_comments, JsonCodec};
pub use registry::{from_fns, Codec, CodecRegistry, FnCodec};
pub use yaml::YamlCodec;

/// The structured value every codec maps to and from.
pub use serde_json::Value;
