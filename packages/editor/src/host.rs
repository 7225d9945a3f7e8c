//! Ports the editor core calls back into: error reporting, clipboard and
//! file saving. The host (browser shell, CLI, test harness) implements them.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(pub String);

/// Single error callback shared by the sync controller and tree renderer
pub trait ErrorSink {
    fn report_error(&self, message: &str);
}

pub trait SyncHost: ErrorSink {
    /// Put the exact export text on the clipboard
    fn write_clipboard(&self, text: &str) -> Result<(), HostError>;

    /// Called once per successful clipboard write
    fn copy_succeeded(&self);

    /// One-shot file save
    fn save_file(&self, filename: &str, contents: &str) -> Result<(), HostError>;

    /// Import was started: the source pane was cleared and should take focus
    fn focus_source(&self) {}
}
