//! OpenAI-compatible chat-completions client.
//!
//! # Responsibility
//! - Post one JSON-mode chat request per extraction.
//! - Return `choices[0].message.content` as raw text.
//!
//! # Invariants
//! - One blocking HTTP call per `complete`, bounded by the configured timeout.
//! - The API key is only sent as a bearer header and never logged.

use crate::config::{ExtractionConfig, API_KEY_ENV};
use crate::extraction::{ExtractionError, ExtractionRequest, ExtractionService};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;

const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking chat-completions extraction service.
#[derive(Debug, Clone)]
pub struct ChatCompletionsService {
    config: ExtractionConfig,
    client: Client,
}

impl ChatCompletionsService {
    /// Builds a client honouring `config.timeout`.
    ///
    /// # Errors
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Builds a client from process environment settings.
    pub fn from_env() -> Result<Self, ExtractionError> {
        Self::new(ExtractionConfig::from_env())
    }
}

impl ExtractionService for ChatCompletionsService {
    fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ExtractionError::MissingCredentials { env: API_KEY_ENV })?;

        let started_at = Instant::now();
        let body = build_request_body(&self.config.model, request);
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            warn!(
                "event=llm_call module=extraction status=error http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(ExtractionError::status(status.as_u16(), &text));
        }

        info!(
            "event=llm_call module=extraction status=ok model={} duration_ms={} response_bytes={}",
            self.config.model,
            started_at.elapsed().as_millis(),
            text.len()
        );
        parse_completion(&text)
    }
}

/// Request body in chat-completions JSON mode.
pub fn build_request_body(model: &str, request: &ExtractionRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect();

    json!({
        "model": model,
        "temperature": TEMPERATURE,
        "response_format": { "type": "json_object" },
        "messages": messages,
    })
}

/// Extracts the first choice content from a chat-completions response body.
///
/// # Errors
/// - `MalformedResponse` when `body` is not a chat-completions document.
/// - `EmptyResponse` when there is no non-blank content.
pub fn parse_completion(body: &str) -> Result<String, ExtractionError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ExtractionError::EmptyResponse)
}
