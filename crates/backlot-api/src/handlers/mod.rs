//! HTTP request handlers.

pub mod contact;
pub mod images;
pub mod revalidate;
