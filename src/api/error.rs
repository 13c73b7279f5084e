//! Error envelope for the session endpoints.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Session operation a request was trying to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOperation {
    New,
    Open,
    Save,
}

impl SessionOperation {
    /// Fixed message returned to the client when the operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::New => "Could not delete current session.",
            Self::Open => "Could not open session.",
            Self::Save => "Could not save session.",
        }
    }
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Open => "open",
            Self::Save => "save",
        };
        f.write_str(name)
    }
}

/// API error type.
///
/// The host's error chain is logged but never sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", .operation.failure_message())]
    HostOperation {
        operation: SessionOperation,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn host_operation(operation: SessionOperation, source: impl Into<anyhow::Error>) -> Self {
        Self::HostOperation {
            operation,
            source: source.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::HostOperation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body returned for every failed session operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            ApiError::HostOperation { operation, source } => {
                error!(%operation, error = ?source, "{message}");
            }
        }

        (status, Json(ErrorMessage { message })).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
