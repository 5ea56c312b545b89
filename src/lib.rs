pub mod api;
pub mod config;
pub mod error;
pub mod github;
pub mod rss;

use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use config::Config;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

// Create a static client to reuse connections
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});
