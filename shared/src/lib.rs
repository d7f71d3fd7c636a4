pub mod adapters;
pub mod configuration;
pub mod core;
pub mod email;
pub mod notifier;
pub mod templates;
pub mod tracking;
pub mod utils;

pub use reqwest::Client;

/// Applied to every outbound HTTP call made by the functions.
pub const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
