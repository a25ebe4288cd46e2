pub mod config;
pub mod github;
pub mod http;
pub mod page;
pub mod platform;
pub mod version;
