//! OpenAI-compatible chat completions.

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

pub const NAME: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f64 = 0.7;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    content: Option<String>,
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiProvider {
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
        let request = ChatRequest {
            model: &self.model,
            messages: wire_messages(messages),
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            stream,
        };
        debug!(model = %self.model, messages = messages.len(), stream, "sending chat completion");
        let response = self
            .client
            .post(endpoint_url(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        ensure_success(response).await
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let body = self.send(messages, false).await?.bytes().await?;
        let completion: ChatCompletion = serde_json::from_slice(&body)?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn stream(
        &self,
        messages: &[Message],
        sink: &mut (dyn Write + Send),
    ) -> Result<(), ProviderError> {
        let response = self.send(messages, true).await?;
        relay(response, sink, decode_chunk).await
    }
}

fn decode_chunk(payload: &str) -> Result<Step, ProviderError> {
    if payload == "[DONE]" {
        return Ok(Step::Done);
    }
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if let Some(err) = stream_error(&value) {
        return Err(err);
    }
    let chunk: ChatChunk = serde_json::from_value(value)?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .map_or(Step::Skip, Step::Text))
}

#[async_trait]
impl Provider for OpenAiProvider {
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
