//! Ollama inference backend.
//!
//! Talks to a local Ollama server through its generate endpoint. Answers are
//! decoded greedily and capped at a handful of tokens, because the prompts
//! only ever ask for an option letter or yes/no/maybe.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LlmError;

/// Default Ollama server endpoint.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Sampling temperature for answer prompts. Zero keeps decoding greedy so
/// that a model's answer depends only on the prompt.
const ANSWER_TEMPERATURE: f64 = 0.0;

/// Token budget per completion.
const ANSWER_NUM_PREDICT: u32 = 10;

/// A single completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model tag as known to the backend, e.g. `phi3:mini`.
    pub model: String,
    /// Fully rendered prompt text.
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// Backend capable of answering one prompt with one short completion.
///
/// The runner only depends on this trait, which keeps inference testable
/// without a live server.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate a completion and return its trimmed text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    /// HTTP client for API requests.
    http_client: Client,
    /// Server base URL without trailing slash.
    base_url: String,
}

impl OllamaClient {
    /// Create a client against the default local endpoint.
    pub fn new() -> Self {
        Self::with_base_url(OLLAMA_BASE_URL)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a request with exponential backoff retry logic.
    async fn execute_with_retry(&self, request: &GenerateRequest<'_>) -> Result<String, LlmError> {
        let mut last_error = None;
        let url = format!("{}/api/generate", self.base_url);

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay_ms = BASE_RETRY_DELAY_MS * (1 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = delay_ms,
                    "Retrying Ollama request after transient failure"
                );
            }

            match self.execute_request(&url, request).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if is_transient_error(&err) {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            error = %err,
                            "Transient error, will retry"
                        );
                        last_error = Some(err);
                    } else {
                        return Err(err);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::RequestFailed("Max retries exceeded with no error captured".to_string())
        }))
    }

    /// Execute a single request (no retry logic).
    async fn execute_request(
        &self,
        url: &str,
        request: &GenerateRequest<'_>,
    ) -> Result<String, LlmError> {
        let http_response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = http_response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            if let Ok(error_response) = serde_json::from_str::<ServerError>(&error_text) {
                return Err(LlmError::ApiError {
                    code: status_code,
                    message: error_response.error,
                });
            }
            return Err(LlmError::ApiError {
                code: status_code,
                message: error_text,
            });
        }

        let generate_response: GenerateResponse = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))?;

        Ok(generate_response.response.trim().to_string())
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let generate_request = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: ANSWER_TEMPERATURE,
                num_predict: ANSWER_NUM_PREDICT,
            },
        };
        self.execute_with_retry(&generate_request).await
    }
}

/// Check if an error is transient and should be retried.
fn is_transient_error(error: &LlmError) -> bool {
    match error {
        LlmError::RequestFailed(msg) => {
            // Network errors, timeouts, connection issues
            msg.contains("timeout")
                || msg.contains("connection")
                || msg.contains("temporarily")
                || msg.contains("Connection refused")
        }
        LlmError::ApiError { code, .. } => *code >= 500,
        _ => false,
    }
}

/// Internal request structure for the generate endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Decoding options sent with every request.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

/// Internal response structure from the generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Error response from the server.
#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
}
