//! Shared constants used across the application

use std::time::Duration;

/// Ceiling on a single provider call made on behalf of one input line.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix that marks an input word as a command name.
pub const COMMAND_PREFIX: &str = ":";

/// Branch every conversation starts on.
pub const DEFAULT_BRANCH: &str = "main";

/// Prompt shown before each interactive input line.
pub const PROMPT: &str = "nexus> ";

/// Environment variable read for the tracing filter.
pub const LOG_ENV_VAR: &str = "NEXUS_LOG";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV_VAR: &str = "NEXUS_CONFIG_DIR";
