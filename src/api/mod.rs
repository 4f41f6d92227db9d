//! HTTP backends for the supported model vendors.

pub mod anthropic;
pub mod openai;
mod sse;

#[cfg(test)]
pub(crate) mod test_server;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use serde::Serialize;

use crate::core::message::Message;
use crate::core::provider::ProviderError;

/// One history entry as both vendors expect it on the wire.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

pub(crate) fn wire_messages(messages: &[Message]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .map(|message| WireMessage {
            role: message.role.as_str(),
            content: &message.content,
        })
        .collect()
}

/// Pull a human-readable message out of a vendor error payload.
fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Reduce an error response body to one line for [`ProviderError::Status`].
pub(crate) fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<no body>".to_string();
    }
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .unwrap_or_else(|| trimmed.to_string())
}

/// An in-stream error event, if `value` is one.
pub(crate) fn stream_error(value: &serde_json::Value) -> Option<ProviderError> {
    value.get("error")?;
    Some(ProviderError::Stream(
        extract_error_summary(value).unwrap_or_else(|| value.to_string()),
    ))
}

pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        message: summarize_error_body(&body),
    })
}
