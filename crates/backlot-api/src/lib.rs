//! Backlot API library
//!
//! HTTP surface of the Backlot site backend: contact form intake, CMS change
//! notifications with route revalidation, and CDN image redirects, plus the
//! middleware wiring shared between the binary and the integration tests.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;
