//! Errors raised by the bundled session host.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("session has no stored file location")]
    NoStoredLocation,

    #[error("current session has unsaved changes")]
    UnsavedChanges,

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid session document {}", path.display())]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported session document version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
