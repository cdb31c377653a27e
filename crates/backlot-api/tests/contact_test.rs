//! Contact endpoint integration tests.
//!
//! Run with: `cargo test -p backlot-api --test contact_test`

mod helpers;

use helpers::{setup_test_app, setup_test_app_without_mailer, valid_submission};
use serde_json::Value;

#[tokio::test]
async fn test_contact_submission_accepted_and_forwarded() {
    let app = setup_test_app();
    let client = app.client();

    let response = client.post("/api/contact").json(&valid_submission()).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "received");
    assert!(body["id"].is_string());

    let headers = response.headers();
    assert_eq!(
        headers.get("X-RateLimit-Limit").unwrap().to_str().unwrap(),
        "5"
    );
    assert_eq!(
        headers
            .get("X-RateLimit-Remaining")
            .unwrap()
            .to_str()
            .unwrap(),
        "4"
    );

    let sent = app.sent_emails();
    assert_eq!(sent.len(), 2);

    let notification = &sent[0];
    assert_eq!(notification.to, "studio@backlot.test");
    assert_eq!(notification.subject, "New inquiry from Ada Byron");
    assert_eq!(notification.reply_to.as_deref(), Some("ada@example.com"));
    assert!(notification.body.contains("product launch film"));

    let acknowledgment = &sent[1];
    assert_eq!(acknowledgment.to, "ada@example.com");
    assert_eq!(acknowledgment.reply_to, None);
}

#[tokio::test]
async fn test_contact_company_is_optional() {
    let app = setup_test_app();
    let mut submission = valid_submission();
    submission.as_object_mut().unwrap().remove("company");

    let response = app.client().post("/api/contact").json(&submission).await;
    assert_eq!(response.status_code(), 200);

    let sent = app.sent_emails();
    assert!(sent[0].body.contains("Company: -"), "{}", sent[0].body);
}

#[tokio::test]
async fn test_contact_rejects_invalid_fields_with_details() {
    let app = setup_test_app();
    let client = app.client();

    let mut submission = valid_submission();
    submission["email"] = Value::from("not-an-email");
    submission["message"] = Value::from("too short");

    let response = client.post("/api/contact").json(&submission).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("email"), "{}", error);
    assert!(error.contains("message"), "{}", error);

    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
async fn test_contact_rejects_malformed_json() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/contact")
        .content_type("application/json")
        .bytes("{\"name\": \"Ada\"".into())
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
async fn test_contact_limits_submissions_per_client() {
    let app = setup_test_app();
    let client = app.client();

    for round in 0..5 {
        let response = client.post("/api/contact").json(&valid_submission()).await;
        assert_eq!(response.status_code(), 200, "submission {}", round);
        let remaining = response
            .headers()
            .get("X-RateLimit-Remaining")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(remaining, (4 - round).to_string());
    }

    let response = client.post("/api/contact").json(&valid_submission()).await;
    assert_eq!(response.status_code(), 429);

    let headers = response.headers();
    let retry_after: u64 = headers
        .get("Retry-After")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    // The whole hour minus however long the five submissions above took.
    assert!((3590..=3600).contains(&retry_after), "{}", retry_after);
    assert_eq!(
        headers
            .get("X-RateLimit-Remaining")
            .unwrap()
            .to_str()
            .unwrap(),
        "0"
    );

    let body: Value = response.json();
    assert_eq!(body["retry_after_seconds"].as_u64(), Some(retry_after));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Too many submissions"));

    // The sixth attempt reached neither mailbox.
    assert_eq!(app.sent_emails().len(), 10);
}

#[tokio::test]
async fn test_contact_rejected_submissions_do_not_consume_allowance() {
    let app = setup_test_app();
    let client = app.client();

    let mut invalid = valid_submission();
    invalid["message"] = Value::from("hi");
    let response = client.post("/api/contact").json(&invalid).await;
    assert_eq!(response.status_code(), 400);

    // All five slots must still be available after the rejection.
    for round in 0..5 {
        let response = client.post("/api/contact").json(&valid_submission()).await;
        assert_eq!(response.status_code(), 200, "submission {}", round);
    }
}

#[tokio::test]
async fn test_contact_clients_have_separate_allowances() {
    let app = setup_test_app();
    let client = app.client();

    for _ in 0..5 {
        let response = client
            .post("/api/contact")
            .add_header("X-Forwarded-For", "203.0.113.10")
            .json(&valid_submission())
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = client
        .post("/api/contact")
        .add_header("X-Forwarded-For", "203.0.113.10")
        .json(&valid_submission())
        .await;
    assert_eq!(response.status_code(), 429);

    let response = client
        .post("/api/contact")
        .add_header("X-Forwarded-For", "203.0.113.77")
        .json(&valid_submission())
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_contact_notification_failure_is_a_gateway_error() {
    let app = setup_test_app();
    app.mailer
        .fail_to
        .lock()
        .unwrap()
        .push("studio@backlot.test".to_string());

    let response = app
        .client()
        .post("/api/contact")
        .json(&valid_submission())
        .await;

    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["code"], "EMAIL_DELIVERY_FAILED");
    // The transport detail stays server-side.
    assert!(!body["error"].as_str().unwrap().contains("connection refused"));
    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
async fn test_contact_acknowledgment_failure_does_not_fail_the_submission() {
    let app = setup_test_app();
    app.mailer
        .fail_to
        .lock()
        .unwrap()
        .push("ada@example.com".to_string());

    let response = app
        .client()
        .post("/api/contact")
        .json(&valid_submission())
        .await;

    assert_eq!(response.status_code(), 200);
    let sent = app.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "studio@backlot.test");
}

#[tokio::test]
async fn test_contact_unconfigured_answers_503() {
    let app = setup_test_app_without_mailer();

    let response = app
        .client()
        .post("/api/contact")
        .json(&valid_submission())
        .await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}
