//! Application state shared across handlers.

use std::sync::Arc;

use crate::host::SessionHost;

#[derive(Clone)]
pub struct AppState {
    /// Host that owns the session and produces the work for each operation.
    pub host: Arc<dyn SessionHost>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Arc<[String]>,
}

impl AppState {
    pub fn new(host: Arc<dyn SessionHost>) -> Self {
        Self {
            host,
            cors_origins: Arc::from(Vec::new()),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Arc::from(origins);
        self
    }
}
