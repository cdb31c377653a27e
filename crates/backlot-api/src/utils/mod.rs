//! Small shared helpers.

pub mod client_ip;
