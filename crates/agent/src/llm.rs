//! Chat-completion client seam.
//!
//! Every agent talks to the model through [`LlmClient`]. The HTTP client speaks
//! the OpenAI-compatible `/chat/completions` shape, which Groq, OpenAI and
//! Ollama all serve.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use greenearth_core::config::{LlmConfig, LlmProvider};
use greenearth_core::errors::ApplicationError;

const BASE_BACKOFF_MS: u64 = 250;
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm client is not configured: {0}")]
    NotConfigured(String),
    #[error("llm transport error: {0}")]
    Transport(String),
    #[error("llm endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
    #[error("llm response contained no message content")]
    EmptyResponse,
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::NotConfigured(_) | Self::Decode(_) | Self::EmptyResponse => false,
        }
    }
}

impl From<LlmError> for ApplicationError {
    fn from(value: LlmError) -> Self {
        match value {
            LlmError::NotConfigured(message) => Self::Configuration(message),
            other => Self::Integration(other.to_string()),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One system + one user message in, trimmed assistant text out.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;

    /// Model name reported by health checks.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct HttpLlmClient {
    client: Client,
    endpoint: String,
    provider: LlmProvider,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
}

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.provider.requires_api_key() && config.api_key.is_none() {
            return Err(LlmError::NotConfigured(
                "llm.api_key is required for groq/openai providers".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| LlmError::NotConfigured(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.endpoint_base()),
            provider: config.provider,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, request: &ChatCompletionRequest<'_>) -> Result<String, LlmError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let payload = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|error| LlmError::Decode(error.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(text) => return Ok(text),
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let delay = Duration::from_millis(BASE_BACKOFF_MS << attempt.min(6));
                    tracing::warn!(
                        event_name = "llm.request.retry",
                        provider = ?self.provider,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying chat completion"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(
                        event_name = "llm.request.failed",
                        provider = ?self.provider,
                        attempts = attempt + 1,
                        error = %error,
                        "chat completion failed"
                    );
                    return Err(error);
                }
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

/// Deterministic client that replays queued replies and records every call.
/// When the queue runs dry it answers with the fallback reply.
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Result<String, LlmError>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedLlmClient {
    pub fn new(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback: Ok("scripted reply".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: impl Into<String>) -> Self {
        Self { fallback: Ok(reply.into()), ..Self::new(Vec::new()) }
    }

    pub fn failing(error: LlmError) -> Self {
        Self { fallback: Err(error), ..Self::new(Vec::new()) }
    }

    /// `(system_prompt, user_prompt)` pairs, oldest first.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((system_prompt.to_string(), user_prompt.to_string()));
        }
        let next = self.replies.lock().ok().and_then(|mut replies| replies.pop_front());
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
