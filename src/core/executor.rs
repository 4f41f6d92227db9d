//! Routes each input line to a command or to the conversation.

use std::error::Error;
use std::fmt;

use tracing::debug;

use crate::commands::{CommandContext, CommandError, CommandInvocation, CommandResult, Registry};
use crate::core::constants::COMMAND_PREFIX;
use crate::core::conversation::{ConversationError, ConversationHandler};

#[derive(Debug)]
pub enum ExecuteError {
    /// The line named a command that is not registered.
    CommandNotFound(String),
    /// A command rejected its arguments.
    InvalidArguments {
        command: String,
        source: CommandError,
    },
    /// A command failed for any other reason.
    Command {
        command: String,
        source: CommandError,
    },
    /// The conversation turn failed.
    Conversation(ConversationError),
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::CommandNotFound(name) => write!(
                f,
                "unknown command: {name} (type :help for available commands)"
            ),
            ExecuteError::InvalidArguments { command, source } => {
                write!(f, "invalid arguments for {command}: {source}")
            }
            ExecuteError::Command { command, source } => {
                write!(f, "error executing {command}: {source}")
            }
            ExecuteError::Conversation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExecuteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExecuteError::CommandNotFound(_) => None,
            ExecuteError::InvalidArguments { source, .. } => Some(source),
            ExecuteError::Command { source, .. } => Some(source),
            ExecuteError::Conversation(err) => Some(err),
        }
    }
}

/// Owns the command registry and the single conversation handler of a
/// session.
pub struct Executor {
    registry: Registry,
    conversation: ConversationHandler,
}

impl Executor {
    pub fn new(conversation: ConversationHandler) -> Self {
        Self::with_registry(Registry::with_builtins(), conversation)
    }

    pub fn with_registry(registry: Registry, conversation: ConversationHandler) -> Self {
        Self {
            registry,
            conversation,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn conversation(&self) -> &ConversationHandler {
        &self.conversation
    }

    /// Process one raw input line.
    ///
    /// Blank lines do nothing. A line whose first word starts with `:` runs
    /// that command; anything else becomes a conversation turn.
    pub async fn execute(&mut self, input: &str) -> Result<CommandResult, ExecuteError> {
        debug!(input = %input, "executor received input");

        let input = input.trim();
        if input.is_empty() {
            return Ok(CommandResult::Continue);
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let (name, args) = match parts.split_first() {
            Some((name, args)) if name.starts_with(COMMAND_PREFIX) => (*name, args),
            _ => {
                debug!("handling input as conversation");
                self.conversation
                    .handle(input)
                    .await
                    .map_err(ExecuteError::Conversation)?;
                return Ok(CommandResult::Continue);
            }
        };

        let command = *self
            .registry
            .get(name)
            .ok_or_else(|| ExecuteError::CommandNotFound(name.to_string()))?;
        debug!(command = name, args = args.len(), "dispatching command");

        let mut ctx = CommandContext {
            conversation: &mut self.conversation,
            registry: &self.registry,
        };
        (command.handler)(&mut ctx, CommandInvocation { name, args }).map_err(|source| {
            if source.is_invalid_arguments() {
                ExecuteError::InvalidArguments {
                    command: name.to_string(),
                    source,
                }
            } else {
                ExecuteError::Command {
                    command: name.to_string(),
                    source,
                }
            }
        })
    }

    /// Command names and descriptions for completing `word`, ordered by
    /// name. Only words that start with `:` get suggestions.
    pub fn suggestions(&self, word: &str) -> Vec<(&'static str, &'static str)> {
        if !word.starts_with(COMMAND_PREFIX) {
            return Vec::new();
        }
        let word = word.to_lowercase();
        self.registry
            .sorted()
            .into_iter()
            .filter(|command| command.name.to_lowercase().starts_with(&word))
            .map(|command| (command.name, command.description))
            .collect()
    }
}
