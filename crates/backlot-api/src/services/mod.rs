//! Application services.

pub mod email;
