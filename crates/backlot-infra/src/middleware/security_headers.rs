//! Security response headers.
//!
//! Applied to every response. The CSP is built once per process from the
//! asset CDN origin so image URLs in API payloads stay loadable by browsers
//! that enforce it against our responses.

use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SecurityHeadersConfig {
    /// Extra origin allowed in `img-src` and `connect-src`.
    pub asset_cdn_origin: Option<String>,
    pub is_production: bool,
}

impl SecurityHeadersConfig {
    pub fn new(asset_cdn_origin: Option<String>, is_production: bool) -> Self {
        Self {
            asset_cdn_origin,
            is_production,
        }
    }

    fn build_csp(&self) -> String {
        let cdn = self.asset_cdn_origin.as_deref().unwrap_or_default();
        let parts = [
            "default-src 'self'".to_string(),
            "script-src 'self'".to_string(),
            "style-src 'self'".to_string(),
            format!("img-src 'self' data: {}", cdn).trim_end().to_string(),
            "font-src 'self' data:".to_string(),
            format!("connect-src 'self' {}", cdn).trim_end().to_string(),
            "frame-ancestors 'none'".to_string(),
        ];
        parts.join("; ")
    }
}

/// Adds the standard security headers to every HTTP response.
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    // Redundant with CSP frame-ancestors, kept for older browsers.
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if config.is_production {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if let Ok(header_value) = HeaderValue::from_str(&config.build_csp()) {
        headers.insert("Content-Security-Policy", header_value);
    }

    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    // API responses are per-caller; keep shared caches out of the path.
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, private"),
    );

    response
}
