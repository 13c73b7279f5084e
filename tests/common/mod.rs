//! Test utilities and common setup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use session_rest::api::{self, AppState};
use session_rest::host::SessionHost;
use session_rest::work::WorkSequence;

/// Host whose behaviour is scripted by the test.
///
/// Every operation produces three units. `fail_produce` makes the operation
/// itself fail; `fail_unit` makes the second unit fail.
#[derive(Default)]
pub struct ScriptedHost {
    pub name: Mutex<Option<String>>,
    pub stored: Mutex<Option<PathBuf>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_produce: AtomicBool,
    pub fail_unit: AtomicBool,
    pub units_run: Arc<AtomicUsize>,
}

impl ScriptedHost {
    pub fn named(name: &str) -> Self {
        let host = Self::default();
        *host.name.lock().unwrap() = Some(name.to_string());
        host
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn units_run(&self) -> usize {
        self.units_run.load(Ordering::SeqCst)
    }

    fn produce(&self, call: String) -> anyhow::Result<WorkSequence> {
        self.calls.lock().unwrap().push(call);
        if self.fail_produce.load(Ordering::SeqCst) {
            anyhow::bail!("host refused the operation");
        }

        let fail_unit = self.fail_unit.load(Ordering::SeqCst);
        let mut sequence = WorkSequence::new();
        for step in 0..3 {
            let counter = self.units_run.clone();
            sequence = sequence.then(format!("step {step}"), move |_| {
                if fail_unit && step == 1 {
                    anyhow::bail!("step {step} failed");
                }
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        Ok(sequence)
    }
}

impl SessionHost for ScriptedHost {
    fn current_session_file_name(&self) -> Option<String> {
        self.name.lock().unwrap().clone()
    }

    fn current_session_file(&self) -> Option<PathBuf> {
        self.stored.lock().unwrap().clone()
    }

    fn new_session(&self, confirm_discard: bool) -> anyhow::Result<WorkSequence> {
        self.produce(format!("new:{confirm_discard}"))
    }

    fn open_session(&self, file: &Path) -> anyhow::Result<WorkSequence> {
        self.produce(format!("open:{}", file.display()))
    }

    fn save_session(&self) -> anyhow::Result<WorkSequence> {
        self.produce("save".to_string())
    }

    fn save_session_as(&self, file: &Path) -> anyhow::Result<WorkSequence> {
        self.produce(format!("save_as:{}", file.display()))
    }
}

/// Create a test application backed by `host`.
pub fn test_app(host: Arc<dyn SessionHost>) -> Router {
    api::create_router(AppState::new(host))
}

/// Send a body-less request, check the response is JSON and decode it.
pub async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(method)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}
