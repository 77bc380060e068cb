//! Remote completion collaborator
//!
//! The classifier talks to the completion service through the
//! [`CompletionBackend`] trait so the outcome logic can be exercised without
//! a network. [`OpenAiClient`] is the production implementation against an
//! OpenAI-compatible `chat/completions` endpoint.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::ChatMessage;

/// Default API base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Completion failure taxonomy.
///
/// `InvalidRequest` carries the provider's human-readable message verbatim;
/// the classifier matches on it to tell an oversized context apart from other
/// rejected requests.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The provider rejected the request itself
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Provider-side failure other than request validation
    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Network or protocol failure before a usable response arrived
    #[error("completion transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A response arrived but did not look like a completion
    #[error("unexpected completion payload: {0}")]
    Payload(String),
}

/// Boundary to the remote completion service
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Request a single completion for a role-tagged message sequence.
    ///
    /// Returns the first choice's `message.content`, which may be absent.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, CompletionError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// OpenAI-compatible chat completion client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client against the default OpenAI endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    /// Create a client against a custom OpenAI-compatible endpoint
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from `OPENAI_API_KEY` (and optional `OPENAI_BASE_URL`)
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_BASE_URL.to_string());
        Ok(Self::with_base_url(api_key, base_url))
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, CompletionError> {
        debug!("completion request: model={} turns={}", model, messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ChatRequest { model, messages })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_http_error(status.as_u16(), &body));
        }

        let raw: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Payload(format!("not JSON: {e}")))?;

        Ok(reply_from_response(&raw))
    }
}

/// Map a non-2xx completion response to the error taxonomy.
///
/// Request validation failures (HTTP 400 or `error.type` of
/// `invalid_request_error`) keep the provider's message verbatim.
fn classify_http_error(status: u16, body: &str) -> CompletionError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error_field = |key: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(|e| e.get(key))
            .and_then(|f| f.as_str())
            .map(str::to_string)
    };

    let message = error_field("message").unwrap_or_else(|| body.trim().to_string());
    let invalid =
        status == 400 || error_field("type").as_deref() == Some("invalid_request_error");

    if invalid {
        CompletionError::InvalidRequest(message)
    } else {
        CompletionError::Api { status, message }
    }
}

/// Extract the first choice's content; absent or null content is `None`
fn reply_from_response(raw: &serde_json::Value) -> Option<String> {
    raw.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
}
