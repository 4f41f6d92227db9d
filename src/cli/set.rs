//! `nexus set`: change one persisted configuration value.

use std::error::Error;
use std::fmt;

use crate::core::config::Config;
use crate::core::keys::PROVIDERS;

/// Keys accepted by `nexus set`, with the usage shown when arguments are wrong.
pub const SETTING_KEYS: &[(&str, &str)] = &[
    ("default-provider", "nexus set default-provider <provider>"),
    ("default-model", "nexus set default-model <provider> <model>"),
    ("streaming", "nexus set streaming on|off"),
    ("request-timeout", "nexus set request-timeout <seconds>"),
];

#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    UnknownProvider(String),
    InvalidValue { input: String, usage: &'static str },
    MissingArgs { usage: &'static str },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                let keys: Vec<&str> = SETTING_KEYS.iter().map(|(key, _)| *key).collect();
                write!(f, "unknown config key: {key} (expected one of: {})", keys.join(", "))
            }
            SettingError::UnknownProvider(input) => write!(
                f,
                "unknown provider: {input}. Run 'nexus providers' to list known providers"
            ),
            SettingError::InvalidValue { input, usage } => {
                write!(f, "invalid value: {input}\nusage: {usage}")
            }
            SettingError::MissingArgs { usage } => write!(f, "usage: {usage}"),
        }
    }
}

impl Error for SettingError {}

fn usage_for(key: &str) -> Option<&'static str> {
    SETTING_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, usage)| *usage)
}

fn known_provider(input: &str) -> Result<&'static str, SettingError> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(input))
        .map(|spec| spec.name)
        .ok_or_else(|| SettingError::UnknownProvider(input.to_string()))
}

fn parse_toggle(input: &str, usage: &'static str) -> Result<bool, SettingError> {
    match input.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(SettingError::InvalidValue {
            input: input.to_string(),
            usage,
        }),
    }
}

/// Apply `key` to `config` and describe the change. Nothing is written to disk.
pub fn apply_setting(
    config: &mut Config,
    key: &str,
    values: &[String],
) -> Result<String, SettingError> {
    let usage = usage_for(key).ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;

    match (key, values) {
        ("default-provider", [provider]) => {
            let provider = known_provider(provider)?;
            config.default_provider = Some(provider.to_string());
            Ok(format!("Set default-provider to: {provider}"))
        }
        ("default-model", [provider, model @ ..]) if !model.is_empty() => {
            let provider = known_provider(provider)?;
            let model = model.join(" ");
            config.set_provider_model(provider, model.clone());
            Ok(format!("Set default-model for {provider} to: {model}"))
        }
        ("streaming", [toggle]) => {
            let enabled = parse_toggle(toggle, usage)?;
            config.streaming = Some(enabled);
            Ok(format!(
                "Set streaming to: {}",
                if enabled { "on" } else { "off" }
            ))
        }
        ("request-timeout", [secs]) => {
            let secs = secs.parse::<u64>().map_err(|_| SettingError::InvalidValue {
                input: secs.clone(),
                usage,
            })?;
            config.request_timeout_secs = Some(secs);
            Ok(format!(
                "Set request-timeout to: {}s",
                config.request_timeout().as_secs()
            ))
        }
        _ => Err(SettingError::MissingArgs { usage }),
    }
}
