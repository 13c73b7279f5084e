//! Progress reporting sink handed to every work unit.

/// Severity of a message shown through a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

/// Capability set a work unit uses to report progress and poll for cancellation.
pub trait ProgressMonitor: Send + Sync {
    /// Set the title of the running unit.
    fn set_title(&self, title: &str);

    /// Report fractional progress in `0.0..=1.0`.
    fn set_progress(&self, progress: f64);

    /// Set the short status line.
    fn set_status_message(&self, message: &str);

    /// Surface a message to the user.
    fn show_message(&self, level: MessageLevel, message: &str);

    /// Whether the caller asked for the operation to stop.
    fn is_cancelled(&self) -> bool;
}

/// Monitor used for requests that have no UI attached.
///
/// Every event is dropped and cancellation is never requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessMonitor;

impl ProgressMonitor for HeadlessMonitor {
    fn set_title(&self, _title: &str) {}

    fn set_progress(&self, _progress: f64) {}

    fn set_status_message(&self, _message: &str) {}

    fn show_message(&self, _level: MessageLevel, _message: &str) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}
