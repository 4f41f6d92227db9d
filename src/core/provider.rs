//! The contract every model backend satisfies.

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::io::Write;
use tokio_util::sync::CancellationToken;

use crate::core::message::Message;

/// A backend capable of producing completions for a conversation.
///
/// Providers are stateless across calls: every call receives the complete
/// history, oldest message first. Both operations must stop and return
/// [`ProviderError::Cancelled`] once `cancel` fires.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs and the CLI (e.g. `"anthropic"`).
    fn name(&self) -> &str;

    /// Wait for the whole reply and return it as one string.
    async fn generate_completion(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
    ) -> Result<String, ProviderError>;

    /// Write reply fragments to `sink` as they arrive, followed by a single
    /// trailing `\n`. Bytes already written stay written when the call fails.
    async fn stream_completion(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        sink: &mut (dyn Write + Send),
    ) -> Result<(), ProviderError>;
}

#[derive(Debug)]
pub enum ProviderError {
    /// The backend was constructed without a credential.
    MissingApiKey,
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),
    /// The backend answered with a non-success status.
    Status { status: u16, message: String },
    /// A response body or stream event could not be decoded.
    Parse(serde_json::Error),
    /// The backend reported a failure in the middle of a stream.
    Stream(String),
    /// The response contained no usable text.
    EmptyResponse,
    /// Writing a fragment to the output sink failed.
    Write(std::io::Error),
    /// The caller's cancellation token fired before the reply completed.
    Cancelled,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::MissingApiKey => write!(f, "API key is required"),
            ProviderError::Transport(err) => write!(f, "request failed: {err}"),
            ProviderError::Status { status, message } => {
                write!(f, "API error ({status}): {message}")
            }
            ProviderError::Parse(err) => write!(f, "failed to parse response: {err}"),
            ProviderError::Stream(message) => write!(f, "stream error: {message}"),
            ProviderError::EmptyResponse => write!(f, "no content in response"),
            ProviderError::Write(err) => write!(f, "write error: {err}"),
            ProviderError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProviderError::Transport(err) => Some(err),
            ProviderError::Parse(err) => Some(err),
            ProviderError::Write(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err)
    }
}
