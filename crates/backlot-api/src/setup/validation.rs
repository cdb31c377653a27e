//! Configuration validation
//!
//! Validates critical configuration at startup to catch misconfigurations
//! before the server starts accepting traffic.

use anyhow::Result;
use backlot_core::Config;

/// Fail fast on configuration that would cause security problems or dead
/// endpoints at runtime.
pub fn validate_config(config: &Config) -> Result<()> {
    if !config.asset_cdn_base_url.starts_with("http://")
        && !config.asset_cdn_base_url.starts_with("https://")
    {
        return Err(anyhow::anyhow!(
            "ASSET_CDN_BASE_URL must be an absolute http(s) URL, got '{}'",
            config.asset_cdn_base_url
        ));
    }

    if config.contact_rate_limit_max == 0 {
        return Err(anyhow::anyhow!("CONTACT_RATE_LIMIT_MAX cannot be 0"));
    }
    if config.contact_rate_limit_window_secs <= 0 {
        return Err(anyhow::anyhow!(
            "CONTACT_RATE_LIMIT_WINDOW_SECS must be positive"
        ));
    }
    if config.contact_rate_limit_max_keys == 0 {
        return Err(anyhow::anyhow!("CONTACT_RATE_LIMIT_MAX_KEYS cannot be 0"));
    }

    if config.is_production() {
        if config.cors_origins.iter().any(|origin| origin == "*") {
            return Err(anyhow::anyhow!(
                "CORS configured to allow all origins (*) in production. \
                 Set specific origins via CORS_ORIGINS."
            ));
        }
        if config.revalidate_secret.is_none() {
            return Err(anyhow::anyhow!(
                "REVALIDATE_WEBHOOK_SECRET must be set in production"
            ));
        }
        if config.smtp_host.is_none() || config.contact_recipient.is_none() {
            tracing::warn!(
                "SMTP or CONTACT_RECIPIENT not configured; the contact form will answer 503"
            );
        }
    }

    if config.trusted_proxy_count > 10 {
        tracing::warn!(
            trusted_proxy_count = config.trusted_proxy_count,
            "TRUSTED_PROXY_COUNT is unusually high; check it matches the proxy chain"
        );
    }

    Ok(())
}
