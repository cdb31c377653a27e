//! Backlot infrastructure library
//!
//! Cross-cutting plumbing shared by the api crate: telemetry setup, request-id
//! and security-header middleware, and outbound route invalidation delivery.

pub mod middleware;
pub mod revalidate;
pub mod telemetry;
