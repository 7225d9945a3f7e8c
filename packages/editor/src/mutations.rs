//! # Document Mutations
//!
//! Serializable edit operations, so edits can cross a process boundary
//! (e.g. a CLI script or a message from a UI shell) and be replayed.
//!
//! ## Semantics
//!
//! ### Set
//! - Replaces the node at `path`; a missing final map key is created
//! - A list index equal to the list length appends
//!
//! ### Remove
//! - Removes a map entry or a list item; later items shift down
//! - The root cannot be removed
//!
//! ### Insert
//! - Inserts into the list at `path` before `index`; `index == len` appends

use crate::{Document, EditorError, Path, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    Set { path: Path, value: Value },

    Remove { path: Path },

    Insert { path: Path, index: usize, value: Value },
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    /// Value displaced by a `Remove`
    pub removed: Option<Value>,
}

impl Mutation {
    pub fn path(&self) -> &Path {
        match self {
            Mutation::Set { path, .. } | Mutation::Remove { path } | Mutation::Insert { path, .. } => {
                path
            }
        }
    }

    /// Check the mutation against the current document shape without
    /// touching it
    pub fn validate(&self, document: &Document) -> Result<(), EditorError> {
        let not_found = || EditorError::PathNotFound(self.path().clone());

        document.with_value(|root| match self {
            Mutation::Set { path, .. } => {
                let Some(parent) = path.parent() else {
                    return Ok(());
                };
                match (lookup(root, &parent), path.last()) {
                    (Some(Value::Object(_)), Some(_)) => Ok(()),
                    (Some(Value::Array(items)), Some(last)) => match last.as_index() {
                        Some(index) if index <= items.len() => Ok(()),
                        _ => Err(not_found()),
                    },
                    _ => Err(not_found()),
                }
            }
            Mutation::Remove { path } => {
                if path.is_root() || lookup(root, path).is_none() {
                    return Err(not_found());
                }
                Ok(())
            }
            Mutation::Insert { path, index, .. } => match lookup(root, path) {
                Some(Value::Array(items)) if *index <= items.len() => Ok(()),
                _ => Err(EditorError::PathNotFound(path.child(*index))),
            },
        })
    }

    /// Validate, then apply to `document` (notifying its listeners)
    pub fn apply(&self, document: &Document) -> Result<MutationResult, EditorError> {
        self.validate(document)?;

        let removed = match self {
            Mutation::Set { path, value } => {
                document.set(path, value.clone())?;
                None
            }
            Mutation::Remove { path } => Some(document.remove(path)?),
            Mutation::Insert { path, index, value } => {
                document.insert(path, *index, value.clone())?;
                None
            }
        };

        Ok(MutationResult {
            version: document.version(),
            removed,
        })
    }
}

impl Document {
    /// Apply a serialized [`Mutation`]
    pub fn apply(&self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        mutation.apply(self)
    }
}

fn lookup<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| match (node, segment) {
            (Value::Object(map), segment) => map.get(&segment.as_key()),
            (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
            _ => None,
        })
}
