//! # Preference Persistence
//!
//! The output format and indentation survive between sessions through a
//! key/value port. The core only ever reads and writes the two keys below.

use crate::EditorError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INDENT_KEY: &str = "indent";
pub const FORMAT_KEY: &str = "format";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), EditorError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RefCell::new(
                values
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EditorError> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object on disk, rewritten on every `set`
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let path = path.into();

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = values.len(), "Opened preference store");
        Ok(Self {
            path,
            values: RefCell::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries, in key order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.values
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn flush(&self) -> Result<(), EditorError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&*self.values.borrow())?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EditorError> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_values([(FORMAT_KEY, "yaml")]);
        assert_eq!(store.get(FORMAT_KEY).as_deref(), Some("yaml"));
        assert_eq!(store.get(INDENT_KEY), None);

        store.set(INDENT_KEY, "tabs").unwrap();
        assert_eq!(store.get(INDENT_KEY).as_deref(), Some("tabs"));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".docsync/prefs.json");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(FORMAT_KEY), None);
        store.set(FORMAT_KEY, "yaml").unwrap();
        store.set(INDENT_KEY, "minified").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(FORMAT_KEY).as_deref(), Some("yaml"));
        assert_eq!(
            reopened.entries(),
            vec![
                ("format".to_string(), "yaml".to_string()),
                ("indent".to_string(), "minified".to_string()),
            ]
        );
    }

    #[test]
    fn test_file_store_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(EditorError::Json(_))));
    }
}
