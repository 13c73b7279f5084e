//! Session endpoint handlers.
//!
//! Each mutating handler asks the host for a work sequence and drains it on a
//! blocking thread with a headless monitor. Any failure, whether producing
//! the sequence or running one of its units, becomes the operation's fixed
//! 500 response.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::error::{ApiError, ApiResult, SessionOperation};
use super::state::AppState;
use crate::host::SessionHost;
use crate::work::{self, HeadlessMonitor, WorkSequence};

/// Current session name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNameView {
    pub name: String,
}

/// Location of the session file just opened or saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFileView {
    pub file: String,
}

/// Confirmation for operations without a more specific result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessMessage {
    pub message: String,
}

/// Query parameters for the open and save endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileQuery {
    /// Session file location; should be an absolute path.
    pub file: Option<String>,
}

impl SessionFileQuery {
    /// Build from raw query pairs. When `file` repeats, the first value wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let file = pairs
            .into_iter()
            .find(|(key, _)| key == "file")
            .map(|(_, value)| value);
        Self { file }
    }

    /// Extract the query for `operation`. A query string axum cannot decode
    /// fails like the operation itself instead of as a plain-text 400.
    fn extract(
        operation: SessionOperation,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> ApiResult<Self> {
        let Query(pairs) = query.map_err(|err| ApiError::host_operation(operation, err))?;
        Ok(Self::from_pairs(pairs))
    }
}

/// Get the current session's file name.
///
/// GET /v1/session/name
#[instrument(skip(state))]
pub async fn get_session_name(State(state): State<AppState>) -> Json<SessionNameView> {
    let name = state.host.current_session_file_name().unwrap_or_default();
    Json(SessionNameView { name })
}

/// Discard the current session and start an empty one.
///
/// DELETE /v1/session/
#[instrument(skip(state))]
pub async fn delete_session(State(state): State<AppState>) -> ApiResult<Json<SuccessMessage>> {
    run_on_host(state.host, SessionOperation::New, |host| {
        execute(host.new_session(true)?)
    })
    .await?;

    info!("Started new session");
    Ok(Json(SuccessMessage {
        message: "New session created.".to_string(),
    }))
}

/// Load a session from a file.
///
/// GET /v1/session/?file=<path>
#[instrument(skip(state))]
pub async fn open_session(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<SessionFileView>> {
    let query = SessionFileQuery::extract(SessionOperation::Open, query)?;
    let file = run_on_host(state.host, SessionOperation::Open, move |host| {
        let path = resolve_file(query.file.as_deref())?;
        execute(host.open_session(&path)?)?;
        Ok(path)
    })
    .await?;

    Ok(Json(SessionFileView {
        file: file.display().to_string(),
    }))
}

/// Save the current session, to `file` when given or to the session's stored
/// location otherwise.
///
/// POST /v1/session/?file=<path>
#[instrument(skip(state))]
pub async fn save_session(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<SessionFileView>> {
    let query = SessionFileQuery::extract(SessionOperation::Save, query)?;
    let file = run_on_host(state.host, SessionOperation::Save, move |host| {
        match query.file.as_deref() {
            Some(file) => {
                let path = resolve_file(Some(file))?;
                execute(host.save_session_as(&path)?)?;
                Ok(path)
            }
            None => {
                execute(host.save_session()?)?;
                let stored = host
                    .current_session_file()
                    .context("host reported no session location after saving")?;
                std::path::absolute(&stored)
                    .with_context(|| format!("resolving session path {}", stored.display()))
            }
        }
    })
    .await?;

    Ok(Json(SessionFileView {
        file: file.display().to_string(),
    }))
}

/// Absolute form of a `file` parameter, resolved against the working
/// directory. The path is not required to exist.
fn resolve_file(file: Option<&str>) -> anyhow::Result<PathBuf> {
    let file = file.context("missing session file location")?;
    std::path::absolute(file).with_context(|| format!("resolving session path {file:?}"))
}

/// Drain a host-produced sequence with a headless monitor.
fn execute(sequence: WorkSequence) -> anyhow::Result<usize> {
    let total = sequence.len();
    let completed = work::drain(sequence, &HeadlessMonitor)?;
    debug!(completed, total, "Work sequence finished");
    Ok(completed)
}

/// Run `job` against the host on the blocking pool and map any failure to
/// the operation's error response.
async fn run_on_host<T, F>(
    host: Arc<dyn SessionHost>,
    operation: SessionOperation,
    job: F,
) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn SessionHost) -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || job(host.as_ref()))
        .await
        .map_err(anyhow::Error::from)
        .and_then(|outcome| outcome)
        .map_err(|err| ApiError::host_operation(operation, err))
}
