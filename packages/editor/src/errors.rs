//! Error types for the editor

use crate::{HostError, Path};
use docsync_codec::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// A mutation addressed a location that does not exist in the
    /// current document shape.
    #[error("Path not found: '{0}'")]
    PathNotFound(Path),

    /// Parse failures (`CodecError::Parse`) and unknown formats
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Clipboard or file save refused by the host
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No document or schema is loaded")]
    NotReady,
}

impl EditorError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, EditorError::Codec(e) if e.is_parse_error())
    }
}
