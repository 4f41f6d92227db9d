//! One-shot "say" command

use std::error::Error;

use crate::core::conversation::ConversationHandler;

/// Send `prompt` as a single turn. The reply is written to the handler's
/// terminal.
pub async fn run_say(
    mut handler: ConversationHandler,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err("usage: nexus say <prompt>".into());
    }

    handler.handle(prompt).await?;
    Ok(())
}
