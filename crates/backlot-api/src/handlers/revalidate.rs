//! CMS change notifications.
//!
//! The CMS POSTs a signed notification whenever a document is published. The
//! signature is an HMAC-SHA256 of the raw body under a shared secret, sent as
//! `X-Webhook-Signature: v1=<hex>`. Verification happens on the exact bytes
//! received, before any JSON parsing. Content types the site does not render
//! are acknowledged and logged, never failed: the CMS retries on errors and
//! an unmapped type would retry forever.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, response::IntoResponse, Json};
use backlot_core::revalidate::routes_for;
use backlot_core::AppError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Change notification payload. The CMS sends the full document; only the
/// type (and id, for logging) matter here.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeNotification {
    #[serde(rename = "_type")]
    pub content_type: String,
    #[serde(rename = "_id", default)]
    pub document_id: Option<String>,
}

/// Per-route outcome of one notification.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevalidationReport {
    pub content_type: String,
    pub revalidated: Vec<String>,
    pub failed: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/revalidate",
    tag = "revalidate",
    request_body = ChangeNotification,
    responses(
        (status = 200, description = "Notification processed", body = RevalidationReport),
        (status = 401, description = "Missing or invalid signature", body = ErrorResponse),
        (status = 503, description = "Webhook secret not configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, body))]
pub async fn handle_change(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let Some(secret) = state.config.revalidate_secret.as_deref() else {
        return Err(HttpAppError(AppError::ServiceUnavailable(
            "Revalidation webhook is not configured".to_string(),
        )));
    };

    verify_signature(&headers, &body, secret).map_err(HttpAppError)?;

    let notification: ChangeNotification =
        serde_json::from_slice(&body).map_err(AppError::from)?;

    let Some(routes) = routes_for(&notification.content_type) else {
        tracing::info!(
            content_type = %notification.content_type,
            document_id = ?notification.document_id,
            "No routes mapped for content type"
        );
        return Ok(Json(RevalidationReport {
            content_type: notification.content_type,
            revalidated: Vec::new(),
            failed: Vec::new(),
        }));
    };

    let mut revalidated = Vec::with_capacity(routes.len());
    let mut failed = Vec::new();
    for route in routes {
        match state.invalidator.invalidate(route).await {
            Ok(()) => revalidated.push((*route).to_string()),
            Err(e) => {
                tracing::warn!(route = %route, error = %e, "Route invalidation failed");
                failed.push((*route).to_string());
            }
        }
    }

    tracing::info!(
        content_type = %notification.content_type,
        document_id = ?notification.document_id,
        revalidated = revalidated.len(),
        failed = failed.len(),
        "Processed change notification"
    );

    Ok(Json(RevalidationReport {
        content_type: notification.content_type,
        revalidated,
        failed,
    }))
}

/// Verify the `v1=<hex hmac-sha256>` signature over the raw body.
fn verify_signature(headers: &HeaderMap, body: &[u8], secret: &str) -> Result<(), AppError> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing webhook signature".to_string()))?;

    let provided = provided
        .strip_prefix("v1=")
        .ok_or_else(|| AppError::Unauthorized("Malformed webhook signature".to_string()))?;

    let expected = signature_hex(secret, body)?;

    // Constant-time comparison; a plain == would leak match length via timing.
    if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Invalid webhook signature".to_string(),
        ))
    }
}

/// Sign `body` the way the CMS does. Shared with the integration tests.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    // new_from_slice only fails on zero-length keys, which config filtering
    // already rules out; fall back to an empty signature rather than panic.
    match signature_hex(secret, body) {
        Ok(hex) => format!("v1={}", hex),
        Err(_) => String::new(),
    }
}

fn signature_hex(secret: &str, body: &[u8]) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("Invalid webhook secret".to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
