use super::config::{self, AssistConfig};
use crate::tools::stackoverflow::StackOverflowService;
use std::sync::Arc;

/// The registered services a request may be routed to, built from the loaded
/// config and one shared HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub stackoverflow: Arc<StackOverflowService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("site", &self.stackoverflow.client().site())
            .field("min_delay", &self.stackoverflow.client().throttle().min_delay())
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client, config: &AssistConfig) -> Self {
        Self {
            stackoverflow: Arc::new(StackOverflowService::new(
                http_client,
                &config.stackexchange,
            )),
        }
    }

    /// Build state from the config file / environment, with the shared HTTP timeouts.
    pub fn from_env() -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config::http_timeout())
            .connect_timeout(config::http_connect_timeout())
            .user_agent(concat!("assist-service/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(http_client, &config::load_assist_config()))
    }
}
