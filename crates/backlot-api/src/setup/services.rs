//! Service wiring.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use backlot_core::Config;
use backlot_infra::revalidate::{HttpInvalidator, LogOnlyInvalidator, RouteInvalidator};

use crate::services::email::{Mailer, SmtpMailer};
use crate::state::AppState;

/// Build the mailer and the route invalidator, then assemble shared state.
///
/// Both services degrade rather than fail: without SMTP settings the contact
/// endpoint answers 503, and without a purge hook URL route invalidation is
/// logged instead of delivered.
pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let mailer: Option<Arc<dyn Mailer>> = match SmtpMailer::from_config(config) {
        Some(mailer) if config.contact_recipient.is_some() => Some(Arc::new(mailer)),
        Some(_) => {
            tracing::warn!(
                "SMTP configured but CONTACT_RECIPIENT is not set; contact form disabled"
            );
            None
        }
        None => {
            tracing::warn!("SMTP not configured; contact form disabled");
            None
        }
    };

    let invalidator: Arc<dyn RouteInvalidator> = match config.frontend_revalidate_url.as_deref() {
        Some(hook_url) => {
            tracing::info!(hook_url = %hook_url, "Delivering route invalidations over HTTP");
            Arc::new(HttpInvalidator::new(
                hook_url,
                Duration::from_secs(config.request_timeout_secs),
            )?)
        }
        None => {
            tracing::info!("No purge hook configured; route invalidation is log-only");
            Arc::new(LogOnlyInvalidator)
        }
    };

    Ok(Arc::new(AppState::new(config.clone(), mailer, invalidator)))
}
