//! Anthropic Messages API.

use std::io::Write;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::sse::{relay, Step};
use super::{ensure_success, stream_error, wire_messages, WireMessage};
use crate::core::message::Message;
use crate::core::provider::{Provider, ProviderError};
use crate::utils::url::endpoint_url;

pub const NAME: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// The stream events we act on; everything else is skipped.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: TextDelta },
    MessageStop,
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextDelta {
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(
        &self,
        messages: &[Message],
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let request = MessagesRequest {
            model: &self.model,
            messages: wire_messages(messages),
            max_tokens: self.max_tokens,
            stream,
        };
        debug!(model = %self.model, messages = messages.len(), stream, "sending messages request");
        let response = self
            .client
            .post(endpoint_url(&self.base_url, "messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;
        ensure_success(response).await
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let body = self.send(messages, false).await?.bytes().await?;
        let response: MessagesResponse = serde_json::from_slice(&body)?;
        response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn stream(
        &self,
        messages: &[Message],
        sink: &mut (dyn Write + Send),
    ) -> Result<(), ProviderError> {
        let response = self.send(messages, true).await?;
        relay(response, sink, decode_event).await
    }
}

fn decode_event(payload: &str) -> Result<Step, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if let Some(err) = stream_error(&value) {
        return Err(err);
    }
    let event: StreamEvent = serde_json::from_value(value)?;
    Ok(match event {
        StreamEvent::ContentBlockDelta { delta } => delta.text.map_or(Step::Skip, Step::Text),
        StreamEvent::MessageStop => Step::Done,
        StreamEvent::Other => Step::Skip,
    })
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_completion(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
    ) -> Result<String, ProviderError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = self.complete(messages) => result,
        }
    }

    async fn stream_completion(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        sink: &mut (dyn Write + Send),
    ) -> Result<(), ProviderError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = self.stream(messages, sink) => result,
        }
    }
}
