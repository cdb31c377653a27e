//! Contact form intake.
//!
//! Order matters here: the payload is validated before the limiter is
//! consulted, so rejected submissions never consume a slot from the client's
//! allowance. Being rate limited is an expected outcome and renders as a 429
//! with a Retry-After hint, not as an error.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use backlot_core::{Admission, AppError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::email::{Mailer, OutboundEmail};
use crate::state::AppState;
use crate::utils::client_ip::ClientKey;

/// Contact form payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactSubmission {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub company: Option<String>,
    #[validate(length(min = 10, max = 5000, message = "must be 10 to 5000 characters"))]
    pub message: String,
}

/// Receipt returned for an accepted submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactReceipt {
    pub id: Uuid,
    pub status: &'static str,
}

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactSubmission,
    responses(
        (status = 200, description = "Submission accepted and forwarded", body = ContactReceipt),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 429, description = "Submission allowance exhausted for this client"),
        (status = 502, description = "Notification email could not be delivered", body = ErrorResponse),
        (status = 503, description = "Contact form not configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, submission, client_key), fields(client_key = %client_key.0))]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    client_key: ClientKey,
    ValidatedJson(submission): ValidatedJson<ContactSubmission>,
) -> Result<Response, HttpAppError> {
    submission.validate().map_err(AppError::from)?;

    let (Some(mailer), Some(recipient)) = (
        state.mailer.as_ref(),
        state.config.contact_recipient.as_deref(),
    ) else {
        return Err(HttpAppError(AppError::ServiceUnavailable(
            "Contact form is not configured".to_string(),
        )));
    };

    let now_ms = Utc::now().timestamp_millis();
    let admission = {
        let mut limiter = state.contact_limiter.lock().await;
        limiter.check_and_record(&client_key.0, now_ms)
    };

    let limit = state.config.contact_rate_limit_max as u32;
    match admission {
        Admission::Limited { retry_after_secs } => {
            tracing::warn!(retry_after_secs, "Contact submission rate limited");
            Ok(rate_limited_response(limit, retry_after_secs))
        }
        Admission::Allowed { remaining } => {
            let receipt = deliver(mailer.as_ref(), recipient, &submission).await?;
            tracing::info!(submission_id = %receipt.id, "Contact submission forwarded");

            let mut response = (StatusCode::OK, Json(receipt)).into_response();
            apply_rate_limit_headers(response.headers_mut(), limit, remaining);
            Ok(response)
        }
    }
}

/// Send the studio notification, then the best-effort acknowledgment.
async fn deliver(
    mailer: &dyn Mailer,
    recipient: &str,
    submission: &ContactSubmission,
) -> Result<ContactReceipt, HttpAppError> {
    let id = Uuid::new_v4();

    let notification = OutboundEmail {
        to: recipient.to_string(),
        subject: format!("New inquiry from {}", submission.name),
        body: notification_body(submission, id),
        reply_to: Some(submission.email.clone()),
    };
    mailer.send(&notification).await.map_err(|e| {
        tracing::error!(error = %e, "Notification email failed");
        HttpAppError(AppError::EmailDelivery(e.to_string()))
    })?;

    // Courtesy copy only; the notification already reached the studio.
    let acknowledgment = OutboundEmail {
        to: submission.email.clone(),
        subject: "We received your message".to_string(),
        body: acknowledgment_body(&submission.name),
        reply_to: None,
    };
    if let Err(e) = mailer.send(&acknowledgment).await {
        tracing::warn!(error = %e, "Acknowledgment email failed");
    }

    Ok(ContactReceipt {
        id,
        status: "received",
    })
}

fn notification_body(submission: &ContactSubmission, id: Uuid) -> String {
    format!(
        "New inquiry via the website\n\n\
         Reference: {id}\n\
         Name: {name}\n\
         Email: {email}\n\
         Company: {company}\n\n\
         {message}\n",
        id = id,
        name = submission.name,
        email = submission.email,
        company = submission.company.as_deref().unwrap_or("-"),
        message = submission.message,
    )
}

fn acknowledgment_body(name: &str) -> String {
    format!(
        "Hi {},\n\n\
         Thanks for reaching out. We read every inquiry and will get back to \
         you within two business days.\n\n\
         Backlot Studio\n",
        name
    )
}

fn rate_limited_response(limit: u32, retry_after_secs: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "Too many submissions. Please try again later.",
            "retry_after_seconds": retry_after_secs,
        })),
    )
        .into_response();

    apply_rate_limit_headers(response.headers_mut(), limit, 0);
    if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
        response.headers_mut().insert("Retry-After", value);
    }
    response
}

fn apply_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert("X-RateLimit-Limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", value);
    }
}
