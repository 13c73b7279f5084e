//! Session host seam.
//!
//! The host application owns the session: its state, file format and the
//! steps needed to create, open or save it. The HTTP layer only sees the
//! [`SessionHost`] trait, which hands back a [`WorkSequence`] per operation.
//!
//! [`LocalSessionHost`] is a small file-backed implementation used by the
//! bundled server binary.

mod document;
mod error;
mod local;

pub use document::{DOCUMENT_VERSION, SessionDocument};
pub use error::HostError;
pub use local::{LocalHostConfig, LocalSessionHost};

use std::path::{Path, PathBuf};

use crate::work::WorkSequence;

/// Operations the host exposes for its current session.
///
/// Implementations are called from a blocking thread and must serialize
/// access to their own session state.
pub trait SessionHost: Send + Sync {
    /// File name (no directory) of the current session, if it has one.
    fn current_session_file_name(&self) -> Option<String>;

    /// Full stored location of the current session, if it has one.
    fn current_session_file(&self) -> Option<PathBuf>;

    /// Work needed to replace the current session with an empty one.
    ///
    /// With `confirm_discard` set, unsaved changes are dropped without asking.
    fn new_session(&self, confirm_discard: bool) -> anyhow::Result<WorkSequence>;

    /// Work needed to load the session stored at `file`.
    fn open_session(&self, file: &Path) -> anyhow::Result<WorkSequence>;

    /// Work needed to save the current session to its stored location.
    fn save_session(&self) -> anyhow::Result<WorkSequence>;

    /// Work needed to save the current session to `file`.
    fn save_session_as(&self, file: &Path) -> anyhow::Result<WorkSequence>;
}
