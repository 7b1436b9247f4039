//! Integration tests for the Stonebridge listings gateway.
//!
//! The tests under `tests/` exercise the real gate and the real listings
//! router against scripted in-process mocks of the external collaborators
//! (the contact verification backend, the CRM form-submission API, the
//! hosted form, and the CRM objects API), so they need no network access or
//! credentials. Tests marked `#[ignore]` talk to live deployments instead.
//!
//! # Running Tests
//!
//! ```bash
//! # Hermetic tests
//! cargo test -p stonebridge-integration-tests
//!
//! # Live smoke tests against deployed services
//! LISTINGS_BASE_URL=https://listings.example.com \
//!     cargo test -p stonebridge-integration-tests -- --ignored
//! ```
//!
//! This crate's library is the shared harness: [`serve`] hosts an axum
//! router on an ephemeral port, [`BackendScript`] scripts the mock
//! collaborator endpoints, and [`RequestLog`] records what they received.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{MethodRouter, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use stonebridge_gate::config::GateConfig;

/// Record of every request a mock collaborator received, keyed by a short
/// endpoint name. Cloning shares the log.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    entries: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RequestLog {
    /// Record one request. GET endpoints log their query parameters, POST
    /// endpoints their JSON body.
    pub fn record(&self, name: &str, payload: Value) {
        self.entries
            .lock()
            .expect("request log poisoned")
            .push((name.to_owned(), payload));
    }

    /// How many requests the named endpoint received.
    #[must_use]
    pub fn hits(&self, name: &str) -> usize {
        self.entries
            .lock()
            .expect("request log poisoned")
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }

    /// Payloads the named endpoint received, in arrival order.
    #[must_use]
    pub fn payloads(&self, name: &str) -> Vec<Value> {
        self.entries
            .lock()
            .expect("request log poisoned")
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Whether nothing has been recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("request log poisoned").is_empty()
    }

    /// Poll until the named endpoint has received at least `count`
    /// requests. Panics after two seconds; background pushes that have not
    /// landed by then are not coming.
    pub async fn wait_for(&self, name: &str, count: usize) {
        for _ in 0..200 {
            if self.hits(name) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "endpoint '{name}' saw {} requests, expected {count}",
            self.hits(name)
        );
    }
}

/// Scripted behavior for one mock endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub status: StatusCode,
    pub body: Value,
    /// Served after the request is logged, so a timed-out request still
    /// counts as received.
    pub delay: Duration,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::ok(json!({}))
    }
}

impl Endpoint {
    /// Respond 200 with the given JSON body.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            delay: Duration::ZERO,
        }
    }

    /// Respond with an error status and an empty JSON body.
    #[must_use]
    pub const fn error(status: StatusCode) -> Self {
        Self {
            status,
            body: Value::Null,
            delay: Duration::ZERO,
        }
    }

    /// Delay the response; pair with a short client deadline to script a
    /// timeout.
    #[must_use]
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Canned responses for every external collaborator the gate can reach,
/// served from a single mock router: the verification backend's four
/// endpoints, the CRM form-submission API, and the hosted form page.
#[derive(Debug, Clone, Default)]
pub struct BackendScript {
    pub primary_lookup: Endpoint,
    pub fallback_lookup: Endpoint,
    pub resend: Endpoint,
    pub update_contact: Endpoint,
    pub form_submit: Endpoint,
    pub hosted_form: Endpoint,
}

impl BackendScript {
    /// Build the mock collaborator router, recording every request into
    /// `log` under these names: `check-hubspot-contact`, `check-email`,
    /// `resend-verification`, `update-contact`, `form-submit`,
    /// `hosted-form`.
    #[must_use]
    pub fn router(&self, log: &RequestLog) -> Router {
        Router::new()
            .route(
                "/check-hubspot-contact",
                get_endpoint(log, "check-hubspot-contact", &self.primary_lookup),
            )
            .route(
                "/check-email",
                get_endpoint(log, "check-email", &self.fallback_lookup),
            )
            .route(
                "/resend-verification",
                post_endpoint(log, "resend-verification", &self.resend),
            )
            .route(
                "/update-contact",
                post_endpoint(log, "update-contact", &self.update_contact),
            )
            .route(
                "/submissions/v3/integration/submit/{portal}/{form}",
                post_endpoint(log, "form-submit", &self.form_submit),
            )
            .route(
                "/hosted-form",
                get_endpoint(log, "hosted-form", &self.hosted_form),
            )
    }
}

fn get_endpoint(log: &RequestLog, name: &'static str, endpoint: &Endpoint) -> MethodRouter {
    let log = log.clone();
    let endpoint = endpoint.clone();
    get(move |Query(params): Query<HashMap<String, String>>| {
        let log = log.clone();
        let endpoint = endpoint.clone();
        async move {
            log.record(name, json!(params));
            tokio::time::sleep(endpoint.delay).await;
            (endpoint.status, Json(endpoint.body))
        }
    })
}

fn post_endpoint(log: &RequestLog, name: &'static str, endpoint: &Endpoint) -> MethodRouter {
    let log = log.clone();
    let endpoint = endpoint.clone();
    post(move |Json(body): Json<Value>| {
        let log = log.clone();
        let endpoint = endpoint.clone();
        async move {
            log.record(name, body);
            tokio::time::sleep(endpoint.delay).await;
            (endpoint.status, Json(endpoint.body))
        }
    })
}

/// Serve a router on an ephemeral localhost port. Returns the base URL;
/// the server task runs until the test's runtime shuts down.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Mock server stopped");
        }
    });
    format!("http://{addr}")
}

/// A gate configuration pointed at a mock backend: short deadlines, no
/// optional transports, and every behavior toggle off except the
/// `trust_existing_contacts` default.
#[must_use]
pub fn gate_config(backend_url: &str, data_dir: &Path) -> GateConfig {
    GateConfig {
        backend_url: backend_url.trim_end_matches('/').to_owned(),
        data_dir: data_dir.to_path_buf(),
        api_timeout: Duration::from_millis(500),
        stuck_check_delay: Duration::from_millis(50),
        dev_mode: false,
        trust_existing_contacts: true,
        bypass_auth: false,
        forms: None,
        hosted_form_url: None,
    }
}
