//! File-backed session host.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{HostError, SessionDocument, SessionHost};
use crate::work::WorkSequence;

/// Settings for [`LocalSessionHost`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalHostConfig {
    /// Create missing parent directories when saving.
    pub create_parent_dirs: bool,
    /// Session file opened when the host starts, if any.
    pub startup_file: Option<String>,
}

impl Default for LocalHostConfig {
    fn default() -> Self {
        Self {
            create_parent_dirs: true,
            startup_file: None,
        }
    }
}

#[derive(Debug, Default)]
struct HostState {
    document: SessionDocument,
    file: Option<PathBuf>,
    dirty: bool,
    /// Bumped on every change to `document`; never reset.
    revision: u64,
}

/// Session host that keeps one JSON document in memory and persists it to a
/// single file.
#[derive(Debug, Clone)]
pub struct LocalSessionHost {
    state: Arc<Mutex<HostState>>,
    config: LocalHostConfig,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalSessionHost {
    pub fn new(config: LocalHostConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState::default())),
            config,
        }
    }

    pub fn config(&self) -> &LocalHostConfig {
        &self.config
    }

    /// Snapshot of the session payload.
    pub fn data(&self) -> Map<String, Value> {
        lock(&self.state).document.data.clone()
    }

    /// Set one payload entry and mark the session as modified.
    pub fn set_data(&self, key: impl Into<String>, value: Value) {
        let mut state = lock(&self.state);
        state.document.data.insert(key.into(), value);
        state.dirty = true;
        state.revision += 1;
    }

    /// Whether the session changed since it was last opened or saved.
    pub fn is_dirty(&self) -> bool {
        lock(&self.state).dirty
    }
}

impl SessionHost for LocalSessionHost {
    fn current_session_file_name(&self) -> Option<String> {
        lock(&self.state)
            .file
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn current_session_file(&self) -> Option<PathBuf> {
        lock(&self.state).file.clone()
    }

    fn new_session(&self, confirm_discard: bool) -> anyhow::Result<WorkSequence> {
        let check_state = self.state.clone();
        let reset_state = self.state.clone();

        Ok(WorkSequence::new()
            .then("Check for unsaved changes", move |_| {
                if !confirm_discard && lock(&check_state).dirty {
                    return Err(HostError::UnsavedChanges.into());
                }
                Ok(())
            })
            .then("Reset session", move |monitor| {
                monitor.set_status_message("Creating empty session");
                let mut state = lock(&reset_state);
                let revision = state.revision + 1;
                *state = HostState {
                    revision,
                    ..HostState::default()
                };
                info!("Created new session");
                Ok(())
            }))
    }

    fn open_session(&self, file: &Path) -> anyhow::Result<WorkSequence> {
        let path = file.to_path_buf();
        let raw: Arc<Mutex<Option<String>>> = Arc::default();
        let parsed: Arc<Mutex<Option<SessionDocument>>> = Arc::default();

        let read_path = path.clone();
        let read_raw = raw.clone();
        let parse_path = path.clone();
        let parse_parsed = parsed.clone();
        let state = self.state.clone();

        Ok(WorkSequence::new()
            .then("Read session file", move |monitor| {
                monitor.set_status_message(&format!("Reading {}", read_path.display()));
                let text = fs::read_to_string(&read_path).map_err(|source| HostError::Io {
                    path: read_path.clone(),
                    source,
                })?;
                *lock(&read_raw) = Some(text);
                monitor.set_progress(0.4);
                Ok(())
            })
            .then("Parse session document", move |monitor| {
                let text = lock(&raw)
                    .take()
                    .context("session file was not read")?;
                let doc = SessionDocument::parse(&parse_path, &text)?;
                *lock(&parse_parsed) = Some(doc);
                monitor.set_progress(0.8);
                Ok(())
            })
            .then("Install session", move |monitor| {
                let doc = lock(&parsed)
                    .take()
                    .context("session document was not parsed")?;
                let mut state = lock(&state);
                state.document = doc;
                state.file = Some(path.clone());
                state.dirty = false;
                state.revision += 1;
                monitor.set_progress(1.0);
                info!(file = %path.display(), "Opened session");
                Ok(())
            }))
    }

    fn save_session(&self) -> anyhow::Result<WorkSequence> {
        let stored = lock(&self.state)
            .file
            .clone()
            .ok_or(HostError::NoStoredLocation)?;
        debug!(file = %stored.display(), "Saving session to stored location");
        self.save_session_as(&stored)
    }

    fn save_session_as(&self, file: &Path) -> anyhow::Result<WorkSequence> {
        let path = file.to_path_buf();
        let create_parent_dirs = self.config.create_parent_dirs;
        // Serialized document, its text and the revision it was taken at.
        let staged: Arc<Mutex<Option<(SessionDocument, String, u64)>>> = Arc::default();

        let serialize_state = self.state.clone();
        let serialize_staged = staged.clone();
        let write_path = path.clone();
        let write_staged = staged.clone();
        let record_state = self.state.clone();

        Ok(WorkSequence::new()
            .then("Serialize session", move |_| {
                let (mut doc, revision) = {
                    let state = lock(&serialize_state);
                    (state.document.clone(), state.revision)
                };
                doc.saved_at = Some(Utc::now());
                let text = doc.to_json().context("serializing session document")?;
                *lock(&serialize_staged) = Some((doc, text, revision));
                Ok(())
            })
            .then("Write session file", move |monitor| {
                monitor.set_status_message(&format!("Writing {}", write_path.display()));
                let guard = lock(&write_staged);
                let (_, text, _) = guard
                    .as_ref()
                    .context("session document was not serialized")?;

                let parent = write_path
                    .parent()
                    .filter(|p| create_parent_dirs && !p.as_os_str().is_empty());
                if let Some(parent) = parent {
                    fs::create_dir_all(parent).map_err(|source| HostError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }

                fs::write(&write_path, text).map_err(|source| HostError::Io {
                    path: write_path.clone(),
                    source,
                })?;
                Ok(())
            })
            .then("Record session location", move |_| {
                let (doc, _, revision) = lock(&staged)
                    .take()
                    .context("session document was not serialized")?;
                let mut state = lock(&record_state);
                state.document.saved_at = doc.saved_at;
                state.file = Some(path.clone());
                // Changes made after serializing are not in the file.
                state.dirty = state.revision != revision;
                info!(file = %path.display(), dirty = state.dirty, "Saved session");
                Ok(())
            }))
    }
}
