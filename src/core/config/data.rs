use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-provider overrides. Unset fields fall back to the backend's defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Provider to use when none is given on the command line
    pub default_provider: Option<String>,
    /// Start sessions in streaming mode (defaults to true)
    pub streaming: Option<bool>,
    /// Ceiling on a single completion request, in seconds
    pub request_timeout_secs: Option<u64>,
    /// Overrides keyed by provider name (e.g., "anthropic", "openai")
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}
