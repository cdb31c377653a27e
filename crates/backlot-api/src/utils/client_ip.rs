//! Client identity for rate limiting.
//!
//! The limiter keys on the caller's IP. Behind the usual proxy setup the
//! socket peer is the proxy, so `X-Forwarded-For` is consulted first, walking
//! back past the configured number of trusted hops. Anything a client could
//! have spoofed beyond those hops is ignored. When no address survives
//! parsing, everything falls into one shared "unknown" bucket rather than
//! bypassing the limiter.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::state::AppState;

/// Shared key for requests whose source address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extractor form of [`extract_client_ip`], bound to application state for
/// the trusted proxy depth. The socket peer is read from the connect-info
/// extension when the server was started with one.
pub struct ClientKey(pub String);

impl FromRequestParts<Arc<AppState>> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let socket_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientKey(extract_client_ip(
            &parts.headers,
            socket_addr.as_ref(),
            state.config.trusted_proxy_count,
        )))
    }
}

pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    forwarded_for_client(headers, trusted_proxy_count)
        .or_else(|| real_ip_client(headers))
        .or_else(|| socket_addr.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Pick the client hop out of the `X-Forwarded-For` chain.
///
/// The chain reads client-first: trusted proxies appended themselves at the
/// end, so the client is the entry just before the trusted suffix. Chains too
/// short for that arithmetic fall back to the entry nearest to us.
fn forwarded_for_client(headers: &HeaderMap, trusted_proxy_count: usize) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let chain: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let candidate = if trusted_proxy_count == 0 || chain.len() <= trusted_proxy_count {
        *chain.last()?
    } else {
        chain[chain.len() - trusted_proxy_count - 1]
    };

    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

fn real_ip_client(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-real-ip")?.to_str().ok()?;
    raw.trim().parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn socket(ip: &str) -> SocketAddr {
        format!("{}:443", ip).parse().unwrap()
    }

    #[test]
    fn forwarded_chain_skips_trusted_proxies() {
        // client, intermediate, our proxy
        let headers = headers_with("x-forwarded-for", "203.0.113.7, 198.51.100.1, 10.0.0.1");
        assert_eq!(extract_client_ip(&headers, None, 1), "198.51.100.1");
        assert_eq!(extract_client_ip(&headers, None, 2), "203.0.113.7");
    }

    #[test]
    fn short_chains_use_nearest_entry() {
        let headers = headers_with("x-forwarded-for", "203.0.113.7");
        assert_eq!(extract_client_ip(&headers, None, 3), "203.0.113.7");
    }

    #[test]
    fn garbage_forwarded_for_falls_through() {
        let headers = headers_with("x-forwarded-for", "not-an-ip");
        assert_eq!(
            extract_client_ip(&headers, Some(&socket("192.0.2.9")), 1),
            "192.0.2.9"
        );
    }

    #[test]
    fn real_ip_wins_over_socket() {
        let headers = headers_with("x-real-ip", "203.0.113.50");
        assert_eq!(
            extract_client_ip(&headers, Some(&socket("192.0.2.9")), 1),
            "203.0.113.50"
        );
    }

    #[test]
    fn socket_address_is_last_resort() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_client_ip(&headers, Some(&socket("192.0.2.9")), 1),
            "192.0.2.9"
        );
    }

    #[test]
    fn no_source_collapses_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers, None, 1), UNKNOWN_CLIENT);
    }
}
