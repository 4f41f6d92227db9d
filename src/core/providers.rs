//! Builds the configured backend for a session.

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{anthropic, openai, AnthropicProvider, OpenAiProvider};
use crate::core::config::{Config, ProviderSettings};
use crate::core::keys::{resolve_api_key, KeyError, PROVIDERS};
use crate::core::provider::{Provider, ProviderError};

#[derive(Debug)]
pub enum FactoryError {
    Key(KeyError),
    Provider {
        name: &'static str,
        source: ProviderError,
    },
    ProviderNotFound(String),
    NoProviders,
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::Key(err) => write!(f, "{err}"),
            FactoryError::Provider { name, source } => {
                write!(f, "failed to initialize {name} provider: {source}")
            }
            FactoryError::ProviderNotFound(name) => {
                write!(f, "provider not found or not configured: {name}")
            }
            FactoryError::NoProviders => write!(f, "no providers available"),
        }
    }
}

impl Error for FactoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FactoryError::Key(err) => Some(err),
            FactoryError::Provider { source, .. } => Some(source),
            FactoryError::ProviderNotFound(_) | FactoryError::NoProviders => None,
        }
    }
}

impl From<KeyError> for FactoryError {
    fn from(err: KeyError) -> Self {
        FactoryError::Key(err)
    }
}

/// Knows which providers have credentials and how to build each one.
pub struct ProviderFactory {
    available: Vec<(&'static str, String)>,
    config: Config,
}

impl ProviderFactory {
    /// Resolve keys for every known provider. Fails when a required
    /// provider has no key.
    pub fn new(config: Config, keys_dir: &Path) -> Result<Self, FactoryError> {
        let mut available = Vec::new();
        for spec in PROVIDERS {
            match resolve_api_key(spec, keys_dir)? {
                Some(key) => available.push((spec.name, key)),
                None => debug!(provider = spec.name, "skipping provider without a key"),
            }
        }
        Ok(Self::with_keys(config, available))
    }

    /// A factory over keys the caller already holds, in priority order.
    pub fn with_keys(config: Config, available: Vec<(&'static str, String)>) -> Self {
        Self { available, config }
    }

    /// Names of providers with a key, highest priority first.
    pub fn names(&self) -> Vec<&'static str> {
        self.available.iter().map(|(name, _)| *name).collect()
    }

    /// The configured default when it has a key, otherwise the highest
    /// priority provider that does.
    pub fn default_name(&self) -> Result<&'static str, FactoryError> {
        let configured = self
            .config
            .default_provider
            .as_deref()
            .and_then(|wanted| self.lookup(wanted));
        if let Some((name, _)) = configured {
            return Ok(name);
        }
        if let Some(wanted) = self.config.default_provider.as_deref() {
            info!(provider = wanted, "configured default provider is unavailable");
        }
        self.available
            .first()
            .map(|(name, _)| *name)
            .ok_or(FactoryError::NoProviders)
    }

    /// Build the backend called `name`. `model_override` wins over the
    /// configured model.
    pub fn get(
        &self,
        name: &str,
        model_override: Option<&str>,
    ) -> Result<Arc<dyn Provider>, FactoryError> {
        let (name, key) = self
            .lookup(name)
            .ok_or_else(|| FactoryError::ProviderNotFound(name.to_string()))?;
        let settings = self.config.provider_settings(name).cloned().unwrap_or_default();
        let model = model_override.map(str::to_string).or(settings.model.clone());
        debug!(provider = name, model = ?model, "building provider");

        let provider: Result<Arc<dyn Provider>, ProviderError> = match name {
            anthropic::NAME => build_anthropic(key, &settings, model),
            openai::NAME => build_openai(key, &settings, model),
            _ => return Err(FactoryError::ProviderNotFound(name.to_string())),
        };
        provider.map_err(|source| FactoryError::Provider { name, source })
    }

    fn lookup(&self, name: &str) -> Option<(&'static str, &str)> {
        self.available
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(known, key)| (*known, key.as_str()))
    }
}

fn build_anthropic(
    key: &str,
    settings: &ProviderSettings,
    model: Option<String>,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let mut provider = AnthropicProvider::new(key)?;
    if let Some(base_url) = &settings.base_url {
        provider = provider.with_base_url(base_url);
    }
    if let Some(model) = model {
        provider = provider.with_model(model);
    }
    if let Some(max_tokens) = settings.max_tokens {
        provider = provider.with_max_tokens(max_tokens);
    }
    Ok(Arc::new(provider))
}

fn build_openai(
    key: &str,
    settings: &ProviderSettings,
    model: Option<String>,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let mut provider = OpenAiProvider::new(key)?;
    if let Some(base_url) = &settings.base_url {
        provider = provider.with_base_url(base_url);
    }
    if let Some(model) = model {
        provider = provider.with_model(model);
    }
    if let Some(max_tokens) = settings.max_tokens {
        provider = provider.with_max_tokens(max_tokens);
    }
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::MockServer;
    use crate::core::keys::init_key_dir;
    use crate::core::message::Message;
    use crate::utils::test_utils::TestEnvVarGuard;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    fn both_keys() -> Vec<(&'static str, String)> {
        vec![
            ("anthropic", "ant-key".to_string()),
            ("openai", "sk-key".to_string()),
        ]
    }

    #[test]
    fn new_collects_keys_in_priority_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir = init_key_dir(temp_dir.path()).unwrap();
        std::fs::write(dir.join("anthropic.key"), "ant-file\n").unwrap();
        let mut env_guard = TestEnvVarGuard::new();
        env_guard.remove_var("ANTHROPIC_API_KEY");
        env_guard.set_var("OPENAI_API_KEY", "sk-env");

        let factory = ProviderFactory::new(Config::default(), &dir).unwrap();

        assert_eq!(factory.names(), vec!["anthropic", "openai"]);
        assert_eq!(factory.default_name().unwrap(), "anthropic");
    }

    #[test]
    fn optional_provider_without_key_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let mut env_guard = TestEnvVarGuard::new();
        env_guard.set_var("ANTHROPIC_API_KEY", "ant-env");
        env_guard.remove_var("OPENAI_API_KEY");

        let factory = ProviderFactory::new(Config::default(), temp_dir.path()).unwrap();

        assert_eq!(factory.names(), vec!["anthropic"]);
        assert!(matches!(
            factory.get("openai", None),
            Err(FactoryError::ProviderNotFound(name)) if name == "openai"
        ));
    }

    #[test]
    fn missing_required_key_fails_construction() {
        let temp_dir = TempDir::new().unwrap();
        let mut env_guard = TestEnvVarGuard::new();
        env_guard.remove_var("ANTHROPIC_API_KEY");
        env_guard.set_var("OPENAI_API_KEY", "sk-env");

        let err = ProviderFactory::new(Config::default(), temp_dir.path())
            .err()
            .expect("anthropic key is required");
        assert!(matches!(err, FactoryError::Key(KeyError::Missing { provider: "anthropic", .. })));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn configured_default_wins_when_available() {
        let config = Config {
            default_provider: Some("OpenAI".to_string()),
            ..Default::default()
        };
        let factory = ProviderFactory::with_keys(config, both_keys());
        assert_eq!(factory.default_name().unwrap(), "openai");
    }

    #[test]
    fn unavailable_default_falls_back_to_priority_order() {
        let config = Config {
            default_provider: Some("openai".to_string()),
            ..Default::default()
        };
        let factory =
            ProviderFactory::with_keys(config, vec![("anthropic", "ant-key".to_string())]);
        assert_eq!(factory.default_name().unwrap(), "anthropic");
    }

    #[test]
    fn no_keys_means_no_providers() {
        let factory = ProviderFactory::with_keys(Config::default(), Vec::new());
        assert!(factory.names().is_empty());
        assert!(matches!(factory.default_name(), Err(FactoryError::NoProviders)));
    }

    #[test]
    fn get_builds_named_backends() {
        let factory = ProviderFactory::with_keys(Config::default(), both_keys());
        assert_eq!(factory.get("anthropic", None).unwrap().name(), "anthropic");
        assert_eq!(factory.get("OPENAI", None).unwrap().name(), "openai");
        assert!(matches!(
            factory.get("gemini", None),
            Err(FactoryError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn empty_key_surfaces_provider_error() {
        let factory =
            ProviderFactory::with_keys(Config::default(), vec![("openai", String::new())]);
        let err = factory.get("openai", None).err().expect("empty key");
        assert!(matches!(
            err,
            FactoryError::Provider {
                name: "openai",
                source: ProviderError::MissingApiKey
            }
        ));
    }

    #[tokio::test]
    async fn config_and_cli_overrides_reach_the_wire() {
        let server = MockServer::respond(
            200,
            "application/json",
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        )
        .await;
        let mut config = Config::default();
        config.set_provider_model("openai", "gpt-4o-mini".to_string());
        if let Some(settings) = config.providers.get_mut("openai") {
            settings.base_url = Some(server.base_url.clone());
            settings.max_tokens = Some(99);
        }
        let factory = ProviderFactory::with_keys(config, both_keys());

        let provider = factory.get("openai", Some("gpt-4o")).unwrap();
        provider
            .generate_completion(&CancellationToken::new(), &[Message::user("hi")])
            .await
            .unwrap();

        let request = server.request().await;
        assert_eq!(request.header("authorization"), Some("Bearer sk-key"));
        let body = request.json();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 99);
    }
}
