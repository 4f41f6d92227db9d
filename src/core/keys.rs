//! API key lookup.
//!
//! Keys are read from `<config dir>/keys/<provider>.key` first and from the
//! provider's environment variable second.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

const KEYS_DIR_NAME: &str = "keys";

/// How one provider's credential is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    pub name: &'static str,
    pub env_var: &'static str,
    pub key_file: &'static str,
    pub required: bool,
}

/// Known providers, highest priority first.
pub const PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "anthropic",
        env_var: "ANTHROPIC_API_KEY",
        key_file: "anthropic.key",
        required: true,
    },
    ProviderSpec {
        name: "openai",
        env_var: "OPENAI_API_KEY",
        key_file: "openai.key",
        required: false,
    },
];

/// Where a key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    File,
    Environment,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::File => f.write_str("key file"),
            KeySource::Environment => f.write_str("environment"),
        }
    }
}

#[derive(Debug)]
pub enum KeyError {
    /// A required provider has no key in either location.
    Missing {
        provider: &'static str,
        key_path: PathBuf,
        env_var: &'static str,
    },
    /// The keys directory could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Missing {
                provider,
                key_path,
                env_var,
            } => write!(
                f,
                "no API key found for {provider} provider. Please either:\n\
                 1. Create {} with your API key, or\n\
                 2. Set the {env_var} environment variable",
                key_path.display()
            ),
            KeyError::CreateDir { path, source } => write!(
                f,
                "failed to create key directory {}: {source}",
                path.display()
            ),
        }
    }
}

impl Error for KeyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KeyError::Missing { .. } => None,
            KeyError::CreateDir { source, .. } => Some(source),
        }
    }
}

pub fn keys_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(KEYS_DIR_NAME)
}

/// Make sure the keys directory exists, readable only by the owner on unix.
pub fn init_key_dir(config_dir: &Path) -> Result<PathBuf, KeyError> {
    let dir = keys_dir(config_dir);
    let create_error = |source| KeyError::CreateDir {
        path: dir.clone(),
        source,
    };

    fs::create_dir_all(&dir).map_err(create_error)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o700)).map_err(create_error)?;
    }
    Ok(dir)
}

fn read_key_file(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let key = contents.trim();
    (!key.is_empty()).then(|| key.to_string())
}

/// Find a key without judging whether its absence is an error.
pub fn locate_api_key(spec: &ProviderSpec, keys_dir: &Path) -> Option<(String, KeySource)> {
    if let Some(key) = read_key_file(&keys_dir.join(spec.key_file)) {
        return Some((key, KeySource::File));
    }
    std::env::var(spec.env_var)
        .ok()
        .filter(|key| !key.is_empty())
        .map(|key| (key, KeySource::Environment))
}

/// Resolve the key for `spec`. A missing key is an error only for required
/// providers; optional ones resolve to `None`.
pub fn resolve_api_key(spec: &ProviderSpec, keys_dir: &Path) -> Result<Option<String>, KeyError> {
    match locate_api_key(spec, keys_dir) {
        Some((key, source)) => {
            debug!(provider = spec.name, %source, "resolved API key");
            Ok(Some(key))
        }
        None if spec.required => Err(KeyError::Missing {
            provider: spec.name,
            key_path: keys_dir.join(spec.key_file),
            env_var: spec.env_var,
        }),
        None => Ok(None),
    }
}
