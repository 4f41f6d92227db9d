//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr so they never interleave with conversation
//! output on stdout.

use tracing_subscriber::EnvFilter;

use crate::core::constants::LOG_ENV_VAR;

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "nexus=debug"
    } else {
        "warn"
    }
}

/// Build the filter from `NEXUS_LOG`, falling back to a level chosen by
/// `verbose`.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
