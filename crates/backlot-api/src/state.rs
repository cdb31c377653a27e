//! Shared application state.

use std::sync::Arc;

use backlot_core::{Config, ImageCdn, SubmissionLimiter};
use backlot_infra::revalidate::RouteInvalidator;
use tokio::sync::Mutex;

use crate::services::email::Mailer;

/// Everything handlers need, shared behind one `Arc`.
pub struct AppState {
    pub config: Config,
    pub image_cdn: ImageCdn,
    /// Contact-form limiter. The mutex makes check-and-record atomic across
    /// concurrent submissions, so a burst from one client cannot overshoot
    /// the per-window allowance.
    pub contact_limiter: Mutex<SubmissionLimiter>,
    /// `None` when SMTP or the studio recipient is not configured; the
    /// contact endpoint reports itself unavailable in that case.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub invalidator: Arc<dyn RouteInvalidator>,
}

impl AppState {
    pub fn new(
        config: Config,
        mailer: Option<Arc<dyn Mailer>>,
        invalidator: Arc<dyn RouteInvalidator>,
    ) -> Self {
        let image_cdn = ImageCdn::new(config.asset_cdn_base_url.clone());
        let contact_limiter = Mutex::new(SubmissionLimiter::new(
            config.contact_rate_limit_window_ms(),
            config.contact_rate_limit_max,
            config.contact_rate_limit_max_keys,
        ));
        Self {
            config,
            image_cdn,
            contact_limiter,
            mailer,
            invalidator,
        }
    }
}
