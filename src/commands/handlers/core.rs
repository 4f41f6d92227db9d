use super::invalid_arguments;
use crate::commands::registry::{CommandContext, CommandInvocation};
use crate::commands::{CommandError, CommandResult};

pub(crate) fn handle_help(
    ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    let commands = ctx.registry.sorted();
    let width = commands
        .iter()
        .map(|command| command.name.len())
        .max()
        .unwrap_or(0);

    let mut help = String::from("Available commands:");
    for command in commands {
        help.push_str(&format!(
            "\n  {:<width$}  {}",
            command.name,
            command.description,
            width = width
        ));
    }
    Ok(CommandResult::Message(help))
}

pub(crate) fn handle_quit(
    _ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    if invocation.arg_count() > 0 {
        return Err(invalid_arguments("usage: :quit"));
    }
    Ok(CommandResult::Quit)
}
