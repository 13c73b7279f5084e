//! Work execution errors.

use thiserror::Error;

/// Failure while draining a work sequence.
#[derive(Debug, Error)]
pub enum WorkError {
    #[error("work unit {index} ({title}) failed")]
    UnitFailed {
        index: usize,
        title: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cancelled before work unit {index}")]
    Cancelled { index: usize },
}

impl WorkError {
    /// Position of the unit that stopped the sequence.
    pub fn index(&self) -> usize {
        match self {
            Self::UnitFailed { index, .. } | Self::Cancelled { index } => *index,
        }
    }
}

/// Result type for work execution.
pub type WorkResult<T> = Result<T, WorkError>;
