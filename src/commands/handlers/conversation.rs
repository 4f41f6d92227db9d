use super::invalid_arguments;
use crate::commands::registry::{CommandContext, CommandInvocation};
use crate::commands::{CommandError, CommandResult};

const STREAM_USAGE: &str = "usage: :stream <on|off|status>";

pub(crate) fn handle_stream(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    let action = match invocation.args {
        [action] => *action,
        _ => return Err(invalid_arguments(STREAM_USAGE)),
    };

    let message = match action {
        "on" => {
            ctx.conversation.set_streaming_mode(true);
            "Streaming mode enabled".to_string()
        }
        "off" => {
            ctx.conversation.set_streaming_mode(false);
            "Streaming mode disabled".to_string()
        }
        "status" => {
            let state = if ctx.conversation.is_streaming_enabled() {
                "enabled"
            } else {
                "disabled"
            };
            format!("Streaming mode is {state}")
        }
        other => {
            return Err(invalid_arguments(format!(
                "invalid argument: {other} (expected: on|off|status)"
            )))
        }
    };
    Ok(CommandResult::Message(message))
}

/// Branching is declared but has no behavior; only the argument shape is
/// checked.
pub(crate) fn handle_branch(
    _ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> Result<CommandResult, CommandError> {
    if invocation.arg_count() != 1 {
        return Err(invalid_arguments("usage: :branch <branch>"));
    }
    Err(CommandError::NotImplemented)
}
