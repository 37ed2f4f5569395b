use std::sync::Arc;

use crate::app::config::Config;
use crate::service::gateway::Gateway;
use crate::upstream::fetchers::VideoSource;

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn VideoSource>) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(Gateway::new(source)),
        }
    }

    /// Credential as currently configured.
    pub fn api_key(&self) -> Option<String> {
        self.config.api_key.clone()
    }
}
