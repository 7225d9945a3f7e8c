//! # Docsync Editor
//!
//! Document–text synchronization engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ codec: text ⇄ serde_json::Value             │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + listeners                │
//! │  - SyncController: export / import / copy / │
//! │    download, preview truncation             │
//! │  - TreeRenderer: per-subtree isolation      │
//! │  - ViewBinding: coarse invalidation         │
//! └─────────────────────────────────────────────┘
//!                     ↕
//! ┌─────────────────────────────────────────────┐
//! │ host: SyncHost, NodeView, PreferenceStore   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the source text and the tree are
//!    derived views, recomputed from the document
//! 2. **Single thread**: `Rc` + interior mutability, no locks
//! 3. **Ports at the edges**: clipboard, files, preferences, schema and
//!    node rendering are traits the host implements
//!
//! ## Usage
//!
//! ```rust
//! use docsync_editor::{
//!     CodecRegistry, CommandCounters, CommandKind, Document, ErrorSink,
//!     HostError, IdentitySchema, MemoryStore, SyncConfig, SyncController, SyncHost,
//! };
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Clipboard(RefCell<String>);
//!
//! impl ErrorSink for Clipboard {
//!     fn report_error(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! impl SyncHost for Clipboard {
//!     fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
//!         *self.0.borrow_mut() = text.to_string();
//!         Ok(())
//!     }
//!     fn copy_succeeded(&self) {}
//!     fn save_file(&self, _filename: &str, _contents: &str) -> Result<(), HostError> {
//!         Ok(())
//!     }
//! }
//!
//! let host = Rc::new(Clipboard::default());
//! let mut controller = SyncController::new(
//!     CodecRegistry::with_defaults(),
//!     SyncConfig::default(),
//!     host.clone(),
//!     Rc::new(MemoryStore::new()),
//! )?;
//! controller.set_schema(Some(Rc::new(IdentitySchema)));
//!
//! let document = Document::new(json!({ "a": 1 }));
//! controller.set_document(Some(document.clone()));
//! assert_eq!(controller.source(), "{\n  \"a\": 1\n}\n");
//!
//! let mut counters = CommandCounters::default();
//! counters.bump(CommandKind::Copy);
//! controller.dispatch(&counters);
//! assert_eq!(*host.0.borrow(), "{\n  \"a\": 1\n}\n");
//! # Ok::<(), docsync_editor::EditorError>(())
//! ```

mod binding;
pub mod commands;
mod config;
mod document;
mod errors;
mod host;
mod mutations;
mod path;
pub mod preferences;
pub mod schema;
mod session;
mod sync;
mod tree;

pub use binding::ViewBinding;
pub use commands::{CommandChannel, CommandChannels, CommandCounters, CommandKind};
pub use config::{SyncConfig, DEFAULT_PREVIEW_LIMIT};
pub use document::{ChangeKind, Document, DocumentChange, Subscription};
pub use errors::EditorError;
pub use host::{ErrorSink, HostError, SyncHost};
pub use mutations::{Mutation, MutationResult};
pub use path::{InvalidPath, Path, PathSegment};
pub use preferences::{FileStore, MemoryStore, PreferenceStore};
pub use schema::{IdentitySchema, Schema, SchemaError, StripAnnotations, TransformContext};
pub use session::EditSession;
pub use sync::{truncate_preview, ImportOutcome, OutputSettings, SyncController};
pub use tree::{
    BasicNodeView, NodeView, RenderContext, RenderError, TreeNode, TreeRenderer, NO_LANGUAGE,
};

// Re-export codec types for convenience
pub use docsync_codec::{CodecError, CodecRegistry, Indentation, Value};
