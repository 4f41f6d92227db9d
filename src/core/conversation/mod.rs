//! Conversation state and the per-turn completion pipeline.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::constants::{DEFAULT_BRANCH, DEFAULT_REQUEST_TIMEOUT};
use crate::core::message::Message;
use crate::core::provider::{Provider, ProviderError};
use crate::utils::fanout::FanoutWriter;


/// The mutable state of one conversation.
///
/// Messages are append-only; their order is the order they are replayed to
/// the provider.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    current_branch: String,
    messages: Vec<Message>,
    files: HashMap<String, String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self {
            current_branch: DEFAULT_BRANCH.to_string(),
            messages: Vec::new(),
            files: HashMap::new(),
        }
    }

    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Attached files by name. Carried with the context but not sent to
    /// providers.
    pub fn files(&self) -> &HashMap<String, String> {
        &self.files
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum ConversationError {
    Provider(ProviderError),
    Timeout(Duration),
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationError::Provider(err) => {
                write!(f, "failed to generate response: {err}")
            }
            ConversationError::Timeout(limit) => write!(
                f,
                "failed to generate response: request timed out after {}s",
                limit.as_secs_f64()
            ),
        }
    }
}

impl Error for ConversationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConversationError::Provider(err) => Some(err),
            ConversationError::Timeout(_) => None,
        }
    }
}

impl From<ProviderError> for ConversationError {
    fn from(err: ProviderError) -> Self {
        ConversationError::Provider(err)
    }
}

/// Owns one conversation and turns input lines into provider calls.
///
/// Replies are echoed to the terminal as a side channel; the history is the
/// only place callers should read them back from.
pub struct ConversationHandler {
    context: ConversationContext,
    provider: Arc<dyn Provider>,
    terminal: Box<dyn Write + Send>,
    streaming_mode: bool,
    request_timeout: Duration,
}

impl ConversationHandler {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            context: ConversationContext::new(),
            provider,
            terminal: Box::new(io::stdout()),
            streaming_mode: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replace the destination replies are echoed to (stdout by default).
    pub fn with_terminal(mut self, terminal: Box<dyn Write + Send>) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_streaming_mode(mut self, enabled: bool) -> Self {
        self.streaming_mode = enabled;
        self
    }

    pub fn set_streaming_mode(&mut self, enabled: bool) {
        self.streaming_mode = enabled;
    }

    pub fn is_streaming_enabled(&self) -> bool {
        self.streaming_mode
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn messages(&self) -> &[Message] {
        self.context.messages()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Record `input` as a user turn, ask the provider for a reply, and
    /// record the reply as an assistant turn.
    ///
    /// The user turn is kept even when the provider call fails; the
    /// assistant turn is only appended on success.
    pub async fn handle(&mut self, input: &str) -> Result<(), ConversationError> {
        self.context.push(Message::user(input));

        let cancel = CancellationToken::new();
        let _release = cancel.clone().drop_guard();

        let mut accumulated: Vec<u8> = Vec::new();
        let streaming = self.streaming_mode;
        let limit = self.request_timeout;
        debug!(
            provider = self.provider.name(),
            streaming,
            history = self.context.messages().len(),
            "dispatching completion"
        );

        let outcome = {
            let provider = Arc::clone(&self.provider);
            let history = self.context.messages();
            let terminal = &mut self.terminal;
            let accumulated = &mut accumulated;
            let cancel = &cancel;

            tokio::time::timeout(limit, async move {
                if streaming {
                    let mut sink = FanoutWriter::new(terminal, accumulated);
                    provider.stream_completion(cancel, history, &mut sink).await
                } else {
                    let reply = provider.generate_completion(cancel, history).await?;
                    writeln!(terminal, "{reply}").map_err(ProviderError::Write)?;
                    terminal.flush().map_err(ProviderError::Write)?;
                    accumulated.extend_from_slice(reply.as_bytes());
                    Ok::<(), ProviderError>(())
                }
            })
            .await
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(provider = self.provider.name(), error = %err, "completion failed");
                return Err(err.into());
            }
            Err(_) => {
                cancel.cancel();
                warn!(provider = self.provider.name(), ?limit, "completion timed out");
                return Err(ConversationError::Timeout(limit));
            }
        }

        let mut reply = String::from_utf8_lossy(&accumulated).into_owned();
        if streaming && reply.ends_with('\n') {
            reply.pop();
        }
        self.context.push(Message::assistant(reply));
        Ok(())
    }
}
