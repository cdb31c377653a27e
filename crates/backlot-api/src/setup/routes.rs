//! Route registration and middleware stack.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use backlot_core::Config;
use backlot_infra::middleware::{
    request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes and middleware applied.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(config)?;

    let security_headers = Arc::new(SecurityHeadersConfig::new(
        cdn_origin(&config.asset_cdn_base_url),
        config.is_production(),
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(1024)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let app = Router::new()
        .route("/healthz", get(health))
        .route("/api/contact", post(handlers::contact::submit_contact))
        .route("/api/revalidate", post(handlers::revalidate::handle_change))
        .route(
            "/api/images/{asset_ref}",
            get(handlers::images::redirect_to_cdn),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.contact_max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let cors = if config.cors_origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS: allowing all origins");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        CorsLayer::new().allow_origin(origins)
    };

    Ok(cors
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any))
}

/// Scheme and host of the CDN base URL, for the CSP source list.
fn cdn_origin(base_url: &str) -> Option<String> {
    let scheme_end = base_url.find("://")?;
    let rest = &base_url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    Some(format!("{}{}", &base_url[..scheme_end + 3], &rest[..host_end]))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "contact": if state.mailer.is_some() && state.config.contact_recipient.is_some() {
            "configured"
        } else {
            "disabled"
        },
        "revalidate": if state.config.revalidate_secret.is_some() {
            "configured"
        } else {
            "disabled"
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdn_origin_drops_the_path() {
        assert_eq!(
            cdn_origin("https://cdn.example.com/images/site"),
            Some("https://cdn.example.com".to_string())
        );
        assert_eq!(
            cdn_origin("https://cdn.example.com"),
            Some("https://cdn.example.com".to_string())
        );
        assert_eq!(cdn_origin("not a url"), None);
    }
}
