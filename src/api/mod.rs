//! HTTP API module.
//!
//! Exposes the host's session lifecycle (new, open, save) under `/v1/session`.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorMessage, SessionOperation};
pub use handlers::{SessionFileQuery, SessionFileView, SessionNameView, SuccessMessage};
pub use routes::{SESSION_PREFIX, create_router};
pub use state::AppState;
