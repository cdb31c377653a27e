//! Test helpers: build the router with recording fakes behind it.
//!
//! Run from workspace root: `cargo test -p backlot-api` or a single suite,
//! e.g. `cargo test -p backlot-api --test contact_test`.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use backlot_api::services::email::{Mailer, MailerError, OutboundEmail};
use backlot_api::setup::routes;
use backlot_api::state::AppState;
use backlot_core::Config;
use backlot_infra::revalidate::RouteInvalidator;

pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Configuration used by the test apps. Every field is explicit so tests
/// never read the environment.
pub fn test_config() -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        asset_cdn_base_url: "https://cdn.backlot.test/images/site".to_string(),
        contact_recipient: Some("studio@backlot.test".to_string()),
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        smtp_from: None,
        smtp_tls: true,
        contact_rate_limit_max: 5,
        contact_rate_limit_window_secs: 3600,
        contact_rate_limit_max_keys: 1000,
        contact_max_body_bytes: 65536,
        revalidate_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        frontend_revalidate_url: None,
        trusted_proxy_count: 1,
        request_timeout_secs: 5,
    }
}

/// Mailer that records instead of sending. Recipients listed in `fail_to`
/// make `send` return a transport error.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail_to: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        if self.fail_to.lock().unwrap().contains(&email.to) {
            return Err(MailerError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Invalidator that records purged paths. Paths listed in `fail_paths`
/// error out.
#[derive(Default)]
pub struct RecordingInvalidator {
    pub purged: Mutex<Vec<String>>,
    pub fail_paths: Mutex<Vec<String>>,
}

#[async_trait]
impl RouteInvalidator for RecordingInvalidator {
    async fn invalidate(&self, path: &str) -> Result<(), anyhow::Error> {
        if self.fail_paths.lock().unwrap().iter().any(|p| p == path) {
            anyhow::bail!("purge hook returned 500");
        }
        self.purged.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Test application: server plus handles on the recording fakes.
pub struct TestApp {
    pub server: TestServer,
    pub mailer: Arc<RecordingMailer>,
    pub invalidator: Arc<RecordingInvalidator>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn sent_emails(&self) -> Vec<OutboundEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }

    pub fn purged_paths(&self) -> Vec<String> {
        self.invalidator.purged.lock().unwrap().clone()
    }
}

/// Full router over recording fakes with the default test configuration.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

/// Same as [`setup_test_app`] with a caller-adjusted configuration.
pub fn setup_test_app_with(config: Config) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let invalidator = Arc::new(RecordingInvalidator::default());

    let state = Arc::new(AppState::new(
        config.clone(),
        Some(mailer.clone()),
        invalidator.clone(),
    ));

    let app = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        mailer,
        invalidator,
    }
}

/// App whose contact form has no mailer behind it.
pub fn setup_test_app_without_mailer() -> TestApp {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let invalidator = Arc::new(RecordingInvalidator::default());

    let state = Arc::new(AppState::new(config.clone(), None, invalidator.clone()));

    let app = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        mailer,
        invalidator,
    }
}

/// A syntactically valid submission tests can tweak.
pub fn valid_submission() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada Byron",
        "email": "ada@example.com",
        "company": "Analytical Engines Ltd",
        "message": "We are planning a product launch film and would like a quote.",
    })
}
