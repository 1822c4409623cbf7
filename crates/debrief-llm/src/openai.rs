//! OpenAI-compatible chat-completions backend
//!
//! Sends the assembled prompt to a chat-completions endpoint and applies
//! the retry policy to the transient failure subset. Also works with any
//! API-compatible service via the base URL.

use crate::retry::{run_with_retry, RetryPolicy};
use crate::GenerationError;
use debrief_domain::TextGenerator;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default chat-completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Default cap on generated tokens
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// System role content sent with every request
const SYSTEM_PROMPT: &str = "You are an expert post-mortem analyst.";

/// Sampling and sizing configuration for the generation backend.
///
/// Out-of-range values are rejected by `validate`, never silently clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier
    pub model: String,
    /// Sampling temperature in [0, 2]
    pub temperature: f64,
    /// Cap on generated tokens
    pub max_output_tokens: u32,
    /// Timeout for a single HTTP request (seconds)
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GenerationConfig {
    /// Validate the configuration, failing fast on out-of-range values.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.model.trim().is_empty() {
            return Err(GenerationError::Config("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) || !self.temperature.is_finite() {
            return Err(GenerationError::Config(format!(
                "temperature {} out of range [0, 2]",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(GenerationError::Config(
                "max_output_tokens must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GenerationError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Chat-completions client for OpenAI-compatible APIs.
///
/// Holds no state between calls beyond the shared HTTP connection pool;
/// backoff sleeps are local to the invoking task.
pub struct OpenAiGenerator {
    base_url: String,
    api_key: String,
    config: GenerationConfig,
    policy: RetryPolicy,
    http: reqwest::Client,
}

impl OpenAiGenerator {
    /// Create a new client.
    ///
    /// Fails with `GenerationError::Config` when the configuration is
    /// invalid or the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        config: GenerationConfig,
    ) -> Result<Self, GenerationError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            config,
            policy: RetryPolicy::default(),
            http,
        })
    }

    /// Create a client against the default endpoint.
    pub fn default_endpoint(
        api_key: impl Into<String>,
        config: GenerationConfig,
    ) -> Result<Self, GenerationError> {
        Self::new(DEFAULT_BASE_URL, api_key, config)
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate a completion for the prompt, retrying transient failures
    /// under the configured policy.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        run_with_retry(&self.policy, |attempt| {
            debug!("Generation attempt {} for model {}", attempt, self.config.model);
            self.attempt(prompt)
        })
        .await
    }

    /// One HTTP round trip, classified but not retried.
    async fn attempt(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_output_tokens,
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body_text, retry_after));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(format!("body decode: {}", e)))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                GenerationError::InvalidResponse(format!(
                    "no message content in reply: {}",
                    payload
                ))
            })
    }
}

impl TextGenerator for OpenAiGenerator {
    type Error = GenerationError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        // Blocking wrapper for async callers going through the trait seam
        tokio::runtime::Runtime::new()
            .map_err(|e| GenerationError::Config(format!("runtime: {}", e)))?
            .block_on(async { self.generate(prompt).await })
    }
}

/// Classify a transport-level failure. Timeouts and connection errors are
/// the retryable transient class; request construction errors are fatal.
fn classify_transport(error: reqwest::Error) -> GenerationError {
    if error.is_builder() {
        GenerationError::Fatal(format!("malformed request: {}", error))
    } else {
        GenerationError::Unavailable(error.to_string())
    }
}

/// Classify a non-success HTTP status into the error taxonomy.
fn classify_status(status: u16, body: &str, retry_after: Option<u64>) -> GenerationError {
    match status {
        401 | 403 => GenerationError::Auth(format!("HTTP {}: {}", status, body)),
        429 => GenerationError::RateLimited {
            detail: format!("HTTP 429: {}", body),
            retry_after_secs: retry_after,
        },
        s if s >= 500 => GenerationError::Unavailable(format!("HTTP {}: {}", s, body)),
        s => GenerationError::Fatal(format!("HTTP {}: {}", s, body)),
    }
}

/// Extract a Retry-After header given in whole seconds.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
