use std::time::Duration;

use crate::core::config::data::{Config, ProviderSettings};
use crate::core::constants::DEFAULT_REQUEST_TIMEOUT;

impl Config {
    pub fn streaming_enabled(&self) -> bool {
        self.streaming.unwrap_or(true)
    }

    /// A zero timeout is treated as unset.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn provider_settings(&self, provider: &str) -> Option<&ProviderSettings> {
        self.providers
            .get(&provider.to_lowercase())
            .or_else(|| self.providers.get(provider))
    }

    pub fn set_provider_model(&mut self, provider: &str, model: String) {
        self.providers
            .entry(provider.to_lowercase())
            .or_default()
            .model = Some(model);
    }
}
