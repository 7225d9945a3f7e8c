//! Error types for the codec layer

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed input text. Parsing never has side effects, so the caller
    /// can always retry with corrected text.
    #[error("Parse error ({format}): {message}")]
    Parse { format: String, message: String },

    #[error("Stringify error ({format}): {message}")]
    Stringify { format: String, message: String },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Unknown indentation: {0}")]
    UnknownIndentation(String),
}

impl CodecError {
    /// Format id the error refers to, if any
    pub fn format(&self) -> Option<&str> {
        match self {
            CodecError::Parse { format, .. } | CodecError::Stringify { format, .. } => Some(format),
            CodecError::UnknownFormat(format) => Some(format),
            CodecError::UnknownIndentation(_) => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, CodecError::Parse { .. })
    }
}
