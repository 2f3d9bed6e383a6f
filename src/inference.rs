//! Model runtime client.
//!
//! Defines the [`InferenceClient`] trait and [`OllamaClient`], which calls a
//! local Ollama instance's `POST /api/generate` endpoint.
//!
//! # Outcome mapping
//!
//! | Outcome | Result |
//! |---------|--------|
//! | connection / transport failure | [`InferenceError::Unreachable`] |
//! | non-2xx status | [`InferenceError::RemoteFailure`] with the status code |
//! | 2xx without a string `response` field | [`InferenceError::MalformedResponse`] |
//! | 2xx with `response` | the answer text, verbatim |
//!
//! One attempt per question. There is no retry: the user re-asks.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::models::Prompt;

/// Inference failure. Its `Display` form is the user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Error querying language model: {0}")]
    Unreachable(String),
    #[error("Error: Unable to get response from the language model. Status code: {0}")]
    RemoteFailure(u16),
    #[error("Error: the language model returned a response without an answer")]
    MalformedResponse,
}

/// A backend that turns a prompt into a complete, non-streamed answer.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Returns the model identifier (e.g. `"mistral"`).
    fn model_name(&self) -> &str;

    async fn ask(&self, prompt: &Prompt) -> Result<String, InferenceError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Client for a local Ollama instance.
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.url)
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn ask(&self, prompt: &Prompt) -> Result<String, InferenceError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: prompt.as_str(),
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                InferenceError::Unreachable(format!(
                    "connection error (is Ollama running at {}?): {}",
                    self.url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::RemoteFailure(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| InferenceError::Unreachable(e.to_string()))?;
        parse_generate_response(&bytes)
    }
}

/// Pulls the `response` string out of a successful `/api/generate` body.
fn parse_generate_response(body: &[u8]) -> Result<String, InferenceError> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| InferenceError::MalformedResponse)?;
    json.get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or(InferenceError::MalformedResponse)
}
