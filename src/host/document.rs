//! On-disk session document used by [`LocalSessionHost`](super::LocalSessionHost).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::HostError;

/// Newest document layout this build reads and writes.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Default for SessionDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            created_at: Utc::now(),
            saved_at: None,
            data: Map::new(),
        }
    }
}

impl SessionDocument {
    /// Parse a document read from `path`.
    pub fn parse(path: &Path, text: &str) -> Result<Self, HostError> {
        let doc: SessionDocument =
            serde_json::from_str(text).map_err(|source| HostError::InvalidDocument {
                path: path.to_path_buf(),
                source,
            })?;

        if doc.version > DOCUMENT_VERSION {
            return Err(HostError::UnsupportedVersion {
                found: doc.version,
                supported: DOCUMENT_VERSION,
            });
        }

        Ok(doc)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
