use std::collections::HashMap;

use tracing::debug;

use super::CommandResult;
use crate::core::conversation::ConversationHandler;

pub type CommandHandler =
    fn(&mut CommandContext<'_>, CommandInvocation<'_>) -> Result<CommandResult, super::CommandError>;

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub handler: CommandHandler,
}

/// One parsed command line: the command name and its whitespace-separated
/// arguments.
#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub name: &'a str,
    pub args: &'a [&'a str],
}

impl<'a> CommandInvocation<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// What a command may touch while it runs.
pub struct CommandContext<'a> {
    pub conversation: &'a mut ConversationHandler,
    pub registry: &'a Registry,
}

/// Commands by name. Registering a name twice keeps the later command.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<&'static str, Command>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for command in BUILTIN_COMMANDS {
            registry.register(*command);
        }
        registry
    }

    pub fn register(&mut self, command: Command) {
        if self.commands.insert(command.name, command).is_some() {
            debug!(command = command.name, "replaced previously registered command");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// All commands, in no particular order.
    pub fn list(&self) -> Vec<&Command> {
        self.commands.values().collect()
    }

    /// All commands ordered by name.
    pub fn sorted(&self) -> Vec<&Command> {
        let mut commands = self.list();
        commands.sort_by_key(|command| command.name);
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

const BUILTIN_COMMANDS: &[Command] = &[
    Command {
        name: ":help",
        description: "Display available commands",
        handler: super::handlers::core::handle_help,
    },
    Command {
        name: ":quit",
        description: "Exit the Nexus CLI",
        handler: super::handlers::core::handle_quit,
    },
    Command {
        name: ":branch",
        description: "Create a new branch in the conversation",
        handler: super::handlers::conversation::handle_branch,
    },
    Command {
        name: ":stream",
        description: "Toggle streaming mode for responses (on|off|status)",
        handler: super::handlers::conversation::handle_stream,
    },
];
