//! Application configuration.
//!
//! Everything is sourced from environment variables (a `.env` file is honored
//! in development). Values needed before the server can do anything useful are
//! required; the rest default to values that suit a local setup. Production
//! hardening checks live in the api crate's startup validation, not here.

use std::env;

/// Runtime configuration for the site backend.
#[derive(Clone)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Base URL of the asset CDN, including the project path prefix.
    pub asset_cdn_base_url: String,
    /// Studio inbox that receives contact notifications.
    pub contact_recipient: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: bool,
    pub contact_rate_limit_max: usize,
    pub contact_rate_limit_window_secs: i64,
    pub contact_rate_limit_max_keys: usize,
    pub contact_max_body_bytes: usize,
    /// Shared secret the CMS signs change notifications with.
    pub revalidate_secret: Option<String>,
    /// Purge hook of the rendering layer; log-only delivery when unset.
    pub frontend_revalidate_url: Option<String>,
    pub trusted_proxy_count: usize,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let asset_cdn_base_url = optional_env("ASSET_CDN_BASE_URL")
            .ok_or_else(|| anyhow::anyhow!("ASSET_CDN_BASE_URL must be set"))?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid port number"))?;

        let smtp_tls = env::var("SMTP_TLS")
            .map(|v| v.trim() != "false")
            .unwrap_or(true);

        let contact_rate_limit_max = env::var("CONTACT_RATE_LIMIT_MAX")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("CONTACT_RATE_LIMIT_MAX must be a valid number"))?;

        let contact_rate_limit_window_secs = env::var("CONTACT_RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()
            .map_err(|_| {
                anyhow::anyhow!("CONTACT_RATE_LIMIT_WINDOW_SECS must be a valid number")
            })?;

        let contact_rate_limit_max_keys = env::var("CONTACT_RATE_LIMIT_MAX_KEYS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("CONTACT_RATE_LIMIT_MAX_KEYS must be a valid number"))?;

        let contact_max_body_bytes = env::var("CONTACT_MAX_BODY_BYTES")
            .unwrap_or_else(|_| "65536".to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("CONTACT_MAX_BODY_BYTES must be a valid number"))?;

        let trusted_proxy_count = env::var("TRUSTED_PROXY_COUNT")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("TRUSTED_PROXY_COUNT must be a valid number"))?;

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a valid number"))?;

        Ok(Self {
            server_port,
            environment,
            cors_origins,
            asset_cdn_base_url,
            contact_recipient: optional_env("CONTACT_RECIPIENT"),
            smtp_host: optional_env("SMTP_HOST"),
            smtp_port,
            smtp_username: optional_env("SMTP_USERNAME"),
            smtp_password: optional_env("SMTP_PASSWORD"),
            smtp_from: optional_env("SMTP_FROM"),
            smtp_tls,
            contact_rate_limit_max,
            contact_rate_limit_window_secs,
            contact_rate_limit_max_keys,
            contact_max_body_bytes,
            revalidate_secret: optional_env("REVALIDATE_WEBHOOK_SECRET"),
            frontend_revalidate_url: optional_env("FRONTEND_REVALIDATE_URL"),
            trusted_proxy_count,
            request_timeout_secs,
        })
    }

    /// True when running with production error hygiene.
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    /// Rate-limit window in milliseconds, the unit the limiter tracks.
    pub fn contact_rate_limit_window_ms(&self) -> i64 {
        self.contact_rate_limit_window_secs.saturating_mul(1000)
    }
}

/// Read an env var, treating unset and blank the same way.
fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            asset_cdn_base_url: "https://cdn.example.com/images/site".to_string(),
            contact_recipient: None,
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
            revalidate_secret: None,
            frontend_revalidate_url: None,
            trusted_proxy_count: 1,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn production_detection() {
        let mut config = base_config();
        assert!(!config.is_production());

        config.environment = "production".to_string();
        assert!(config.is_production());

        config.environment = "prod".to_string();
        assert!(config.is_production());

        config.environment = "staging".to_string();
        assert!(!config.is_production());
    }

    #[test]
    fn window_converts_to_milliseconds() {
        let config = base_config();
        assert_eq!(config.contact_rate_limit_window_ms(), 3_600_000);
    }

    #[test]
    fn from_env_applies_defaults() {
        env::set_var("ASSET_CDN_BASE_URL", "https://cdn.example.com/images/site");
        let config = Config::from_env().unwrap();

        assert_eq!(config.server_port, 4000);
        assert_eq!(config.environment, "development");
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.contact_rate_limit_max, 5);
        assert_eq!(config.contact_rate_limit_window_secs, 3600);
        assert_eq!(config.contact_rate_limit_max_keys, 1000);
        assert_eq!(config.smtp_port, 587);
        assert!(config.smtp_tls);
        assert_eq!(config.trusted_proxy_count, 1);
    }
}
