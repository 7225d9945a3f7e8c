//! # Edit Session
//!
//! One named document open for editing. The session owns the current
//! [`Document`] instance; loading new content replaces the instance, so
//! views bound to the old one can notice the switch and rebind.

use crate::{Document, EditorError, Mutation, MutationResult};
use serde_json::Value;
use tracing::info;

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document name, used for download filenames
    pub name: String,

    document: Document,
}

impl EditSession {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            document: Document::new(value),
        }
    }

    /// The current document instance
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the document with a fresh instance holding `value`
    pub fn replace(&mut self, name: impl Into<String>, value: Value) -> &Document {
        self.name = name.into();
        self.document = Document::new(value);
        info!(session = %self.id, name = %self.name, "Loaded new document");
        &self.document
    }

    pub fn apply(&self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        self.document.apply(mutation)
    }

    pub fn version(&self) -> u64 {
        self.document.version()
    }
}
