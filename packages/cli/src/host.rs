//! Terminal implementation of the editor's host ports

use docsync_editor::{ErrorSink, HostError, SyncHost};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Captures the clipboard in memory and saves downloads into `out_dir`.
/// Reported errors are held until a command takes them, so each failure
/// reaches the terminal once.
pub struct TerminalHost {
    out_dir: RefCell<PathBuf>,
    clipboard: RefCell<Option<String>>,
    saved: RefCell<Vec<PathBuf>>,
    errors: RefCell<Vec<String>>,
}

impl TerminalHost {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir: RefCell::new(out_dir),
            clipboard: RefCell::new(None),
            saved: RefCell::new(Vec::new()),
            errors: RefCell::new(Vec::new()),
        }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir.borrow().clone()
    }

    pub fn set_out_dir(&self, out_dir: PathBuf) {
        *self.out_dir.borrow_mut() = out_dir;
    }

    /// Take the last copied text
    pub fn take_clipboard(&self) -> Option<String> {
        self.clipboard.borrow_mut().take()
    }

    /// Files saved so far
    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved.borrow().clone()
    }

    /// Drain the errors reported since the last call
    pub fn take_errors(&self) -> Vec<String> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }
}

impl ErrorSink for TerminalHost {
    fn report_error(&self, message: &str) {
        debug!(%message, "Host error reported");
        self.errors.borrow_mut().push(message.to_string());
    }
}

impl SyncHost for TerminalHost {
    fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        *self.clipboard.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn copy_succeeded(&self) {
        debug!("Export captured");
    }

    fn save_file(&self, filename: &str, contents: &str) -> Result<(), HostError> {
        let out_dir = self.out_dir();
        let path = out_dir.join(filename);
        fs::create_dir_all(&out_dir).map_err(|e| HostError(e.to_string()))?;
        fs::write(&path, contents).map_err(|e| HostError(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), bytes = contents.len(), "Saved file");
        self.saved.borrow_mut().push(path);
        Ok(())
    }
}
