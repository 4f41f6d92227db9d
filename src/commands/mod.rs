//! `:`-prefixed administrative commands.

mod handlers;
pub mod registry;

pub use registry::{Command, CommandContext, CommandHandler, CommandInvocation, Registry};

use std::error::Error;
use std::fmt;


/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    /// Show this text to the user, then continue.
    Message(String),
    /// End the interactive session.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Missing, extra, or malformed arguments. Carries a usage hint.
    InvalidArguments(String),
    /// The command exists but has no behavior yet.
    NotImplemented,
}

impl CommandError {
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, CommandError::InvalidArguments(_))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidArguments(detail) => f.write_str(detail),
            CommandError::NotImplemented => f.write_str("not implemented"),
        }
    }
}

impl Error for CommandError {}
