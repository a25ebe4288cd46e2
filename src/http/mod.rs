//! HTTP client module.

mod client;

pub use client::{HttpClient, build_http_client};
