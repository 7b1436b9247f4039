//! Login and signup flows through the real gate against a scripted
//! verification backend served in-process.
//!
//! These tests are hermetic: every collaborator the gate reaches is a mock
//! on an ephemeral localhost port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use stonebridge_gate::app::{IdleListingsApp, NoticeLevel, Notifier};
use stonebridge_gate::auth::{AuthGate, AuthView};
use stonebridge_gate::config::GateConfig;
use stonebridge_integration_tests::{BackendScript, Endpoint, RequestLog, gate_config, serve};

/// Notifier that records notices and answers every confirm the same way.
struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
    answer: bool,
}

impl RecordingNotifier {
    fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            answer,
        })
    }

    fn has_notice(&self, level: NoticeLevel, fragment: &str) -> bool {
        self.notices
            .lock()
            .expect("notices poisoned")
            .iter()
            .any(|(l, m)| *l == level && m.contains(fragment))
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .expect("notices poisoned")
            .push((level, message.to_owned()));
    }

    async fn confirm(&self, _message: &str) -> bool {
        self.answer
    }
}

fn build_gate(config: GateConfig, notifier: Arc<RecordingNotifier>) -> AuthGate {
    AuthGate::from_config(config, notifier, Arc::new(IdleListingsApp)).expect("gate construction")
}

#[tokio::test]
async fn test_verified_contact_is_admitted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let script = BackendScript {
        primary_lookup: Endpoint::ok(json!({
            "exists": true,
            "verified": true,
            "firstName": "Jordan",
            "lastName": "Lee",
        })),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    let mut config = gate_config(&base, dir.path());
    config.trust_existing_contacts = false;
    let notifier = RecordingNotifier::new(false);
    let mut gate = build_gate(config, Arc::clone(&notifier));

    gate.submit_login("buyer@example.com").await;

    assert_eq!(gate.view(), AuthView::Listings);
    assert!(notifier.has_notice(NoticeLevel::Success, "Login successful"));

    let profile = gate.store().load().await.expect("profile saved");
    assert!(profile.authenticated);
    assert_eq!(profile.first_name, "Jordan");
    assert_eq!(profile.last_name, "Lee");

    // The CRM hears about the authentication in the background.
    log.wait_for("update-contact", 1).await;
    let update = log.payloads("update-contact").remove(0);
    assert_eq!(update["email"], "buyer@example.com");
    assert_eq!(update["properties"]["firstname"], "Jordan");
}

#[tokio::test]
async fn test_unverified_contact_is_sent_to_verification() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let script = BackendScript {
        primary_lookup: Endpoint::ok(json!({
            "exists": true,
            "verified": false,
            "needsVerification": true,
        })),
        resend: Endpoint::ok(json!({ "success": true })),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    let mut config = gate_config(&base, dir.path());
    config.trust_existing_contacts = false;
    let notifier = RecordingNotifier::new(false);
    let mut gate = build_gate(config, Arc::clone(&notifier));

    gate.submit_login("buyer@example.com").await;

    assert_eq!(gate.view(), AuthView::Verification);
    assert_eq!(log.hits("resend-verification"), 1);
    assert!(notifier.has_notice(NoticeLevel::Success, "Verification email has been sent"));
    assert_eq!(
        gate.session()
            .pending_verification_email()
            .await
            .expect("pending email persisted")
            .as_str(),
        "buyer@example.com"
    );
    assert!(gate.store().load().await.is_none_or(|p| !p.authenticated));
}

#[tokio::test]
async fn test_primary_timeout_falls_back_to_not_registered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    // The primary lookup answers well after the client deadline; the
    // fallback answers promptly that the address is unknown.
    let script = BackendScript {
        primary_lookup: Endpoint::ok(json!({ "exists": true, "verified": true }))
            .slow(Duration::from_secs(2)),
        fallback_lookup: Endpoint::ok(json!({ "exists": false })),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    let notifier = RecordingNotifier::new(false);
    let mut gate = build_gate(gate_config(&base, dir.path()), Arc::clone(&notifier));

    gate.submit_login("buyer@example.com").await;

    assert_eq!(gate.view(), AuthView::NotRegistered);
    assert_eq!(log.hits("check-hubspot-contact"), 1);
    assert_eq!(log.hits("check-email"), 1);
    assert!(gate.store().load().await.is_none());
}

#[tokio::test]
async fn test_uncertain_lookup_admits_on_trust() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let script = BackendScript {
        primary_lookup: Endpoint::ok(json!({ "exists": false, "status": "uncertain" })),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    // trust_existing_contacts defaults to true in the harness config.
    let notifier = RecordingNotifier::new(false);
    let mut gate = build_gate(gate_config(&base, dir.path()), Arc::clone(&notifier));

    gate.submit_login("buyer@example.com").await;

    assert_eq!(gate.view(), AuthView::Listings);
    let profile = gate.store().load().await.expect("profile saved");
    assert!(profile.authenticated);
    assert_eq!(profile.first_name, "");
}

#[tokio::test]
async fn test_uncertain_lookup_without_trust_is_not_registered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let script = BackendScript {
        primary_lookup: Endpoint::ok(json!({ "exists": false, "status": "uncertain" })),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    let mut config = gate_config(&base, dir.path());
    config.trust_existing_contacts = false;
    let mut gate = build_gate(config, RecordingNotifier::new(false));

    gate.submit_login("buyer@example.com").await;

    assert_eq!(gate.view(), AuthView::NotRegistered);
    assert!(gate.store().load().await.is_none());
}

#[tokio::test]
async fn test_second_login_is_served_from_the_lookup_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let script = BackendScript {
        primary_lookup: Endpoint::ok(json!({ "exists": true, "verified": true })),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    let mut config = gate_config(&base, dir.path());
    config.trust_existing_contacts = false;

    let mut gate = build_gate(config.clone(), RecordingNotifier::new(false));
    gate.submit_login("buyer@example.com").await;
    assert_eq!(gate.view(), AuthView::Listings);

    // A fresh gate over the same data directory: the lookup comes from the
    // cached result, not the backend.
    let mut second = build_gate(config, RecordingNotifier::new(false));
    second.submit_login("buyer@example.com").await;
    assert_eq!(second.view(), AuthView::Listings);

    assert_eq!(log.hits("check-hubspot-contact"), 1);
    assert_eq!(log.hits("check-email"), 0);
}

#[tokio::test]
async fn test_dev_bypass_never_reaches_the_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let base = serve(BackendScript::default().router(&log)).await;

    let mut config = gate_config(&base, dir.path());
    config.dev_mode = true;
    let notifier = RecordingNotifier::new(false);
    let mut gate = build_gate(config, Arc::clone(&notifier));

    gate.submit_login("dev@example.com").await;

    assert_eq!(gate.view(), AuthView::Listings);
    assert!(notifier.has_notice(NoticeLevel::Success, "Development login"));
    // The backend is up, but no lookup ever went out.
    assert_eq!(log.hits("check-hubspot-contact"), 0);
    assert_eq!(log.hits("check-email"), 0);
}

#[tokio::test]
async fn test_signup_pushes_the_new_contact_to_the_crm() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let base = serve(BackendScript::default().router(&log)).await;

    let notifier = RecordingNotifier::new(false);
    let mut gate = build_gate(gate_config(&base, dir.path()), Arc::clone(&notifier));

    gate.submit_signup("buyer@example.com", "Jordan", "Lee", "0400 000 000")
        .await;

    assert_eq!(gate.view(), AuthView::Verification);
    assert!(notifier.has_notice(NoticeLevel::Success, "check your inbox"));

    // The sync cascade lands on the direct API transport.
    log.wait_for("update-contact", 1).await;
    let update = log.payloads("update-contact").remove(0);
    assert_eq!(update["email"], "buyer@example.com");
    assert_eq!(update["properties"]["firstname"], "Jordan");
    assert_eq!(update["properties"]["phone"], "0400 000 000");
    assert_eq!(update["properties"]["sb_needs_verification"], "Yes");
}

#[tokio::test]
async fn test_repeated_backend_failure_offers_the_manual_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = RequestLog::default();
    let script = BackendScript {
        primary_lookup: Endpoint::error(axum::http::StatusCode::BAD_GATEWAY),
        fallback_lookup: Endpoint::error(axum::http::StatusCode::BAD_GATEWAY),
        ..BackendScript::default()
    };
    let base = serve(script.router(&log)).await;

    let notifier = RecordingNotifier::new(true);
    let mut gate = build_gate(gate_config(&base, dir.path()), Arc::clone(&notifier));

    gate.submit_login("buyer@example.com").await;
    assert_eq!(gate.view(), AuthView::Options);

    gate.submit_login("buyer@example.com").await;
    assert_eq!(gate.view(), AuthView::Listings);
    assert!(notifier.has_notice(NoticeLevel::Info, "Access granted"));

    let profile = gate.store().load().await.expect("profile saved");
    assert!(profile.authenticated);
    assert_eq!(profile.first_name, "");
}
