//! Backlot core library
//!
//! Domain types and logic shared across the Backlot site backend: runtime
//! configuration, the error taxonomy, the CDN image URL builder, the
//! contact-form submission limiter, and the content-to-route revalidation map.

pub mod config;
pub mod error;
pub mod image;
pub mod rate_limit;
pub mod revalidate;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use image::{
    AspectRatio, DisplayOptions, Hotspot, ImageCdn, ImageDescriptor, ImageUrlError,
};
pub use rate_limit::{Admission, SubmissionLimiter};
