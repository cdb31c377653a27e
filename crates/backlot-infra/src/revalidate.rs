//! Outbound route invalidation.
//!
//! When the CMS signals a content change, the api layer resolves the affected
//! routes and hands each one to a [`RouteInvalidator`]. The HTTP
//! implementation POSTs to the rendering layer's purge hook; deployments
//! without a hook run the log-only implementation so the webhook path stays
//! observable end to end.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

/// Delivery seam for route purges. One call per route; implementations
/// report failure per path and callers decide whether that is fatal.
#[async_trait]
pub trait RouteInvalidator: Send + Sync {
    async fn invalidate(&self, path: &str) -> Result<(), anyhow::Error>;
}

/// POSTs `{"path": ...}` to the rendering layer's purge hook.
pub struct HttpInvalidator {
    client: reqwest::Client,
    hook_url: String,
}

impl HttpInvalidator {
    pub fn new(hook_url: impl Into<String>, timeout: Duration) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build revalidation HTTP client")?;
        Ok(Self {
            client,
            hook_url: hook_url.into(),
        })
    }
}

#[async_trait]
impl RouteInvalidator for HttpInvalidator {
    async fn invalidate(&self, path: &str) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .post(&self.hook_url)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await
            .context("Purge hook unreachable")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Purge hook returned {}", status);
        }

        tracing::debug!(path = %path, "Route invalidated");
        Ok(())
    }
}

/// Records the purge in the log and succeeds. Used when no hook is
/// configured, typically local development.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyInvalidator;

#[async_trait]
impl RouteInvalidator for LogOnlyInvalidator {
    async fn invalidate(&self, path: &str) -> Result<(), anyhow::Error> {
        tracing::info!(path = %path, "Route invalidation recorded (no purge hook configured)");
        Ok(())
    }
}
