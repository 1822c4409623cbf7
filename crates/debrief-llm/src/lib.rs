//! Debrief Generation Backend Layer
//!
//! Implementations of the `TextGenerator` trait from `debrief-domain`.
//!
//! # Backends
//!
//! - `MockGenerator`: deterministic fake for testing
//! - `OpenAiGenerator`: chat-completions API over HTTP, with bounded
//!   retry/backoff for transient failures
//!
//! # Examples
//!
//! ```
//! use debrief_llm::MockGenerator;
//! use debrief_domain::TextGenerator;
//!
//! let generator = MockGenerator::new("{\"themes\": []}");
//! let reply = generator.generate("analyze this").unwrap();
//! assert_eq!(reply, "{\"themes\": []}");
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod retry;

use debrief_domain::TextGenerator;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::{GenerationConfig, OpenAiGenerator};
pub use retry::{run_with_retry, RetryPolicy};

/// Errors that can occur while talking to a generation backend.
///
/// `Unavailable` and `RateLimited` are the retryable subset; everything
/// else propagates immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Credential rejected by the backend (401/403); will not resolve on retry
    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// Rate limit exceeded (429); retryable, optionally carrying the
    /// backend's Retry-After hint in seconds
    #[error("Rate limit exceeded: {detail}")]
    RateLimited {
        /// Backend-provided detail
        detail: String,
        /// Retry-After hint, if the backend sent one
        retry_after_secs: Option<u64>,
    },

    /// Transient failure for a single attempt (timeout, connection error,
    /// 5xx); retryable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Retry budget exhausted; carries the last underlying diagnostic
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts actually made
        attempts: u32,
        /// Last per-attempt error, stringified
        last_error: String,
    },

    /// Backend failure that will not resolve on retry (malformed request,
    /// content-policy rejection)
    #[error("Fatal service error: {0}")]
    Fatal(String),

    /// Backend reply body could not be decoded
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    /// Whether retrying the call may resolve this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Unavailable(_) | GenerationError::RateLimited { .. }
        )
    }

    /// Backend-requested retry delay, if any.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            GenerationError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => Some(std::time::Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

/// Deterministic generator for testing.
///
/// Returns canned responses without any network calls. Scripted results
/// (queued errors or replies) take precedence over per-prompt responses,
/// which take precedence over the default response.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    script: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerator {
    /// Create a mock returning a fixed response for all prompts.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a specific response for a given prompt.
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Queue a scripted result consumed by the next call, ahead of any
    /// per-prompt or default response.
    pub fn queue_result(&mut self, result: Result<String, GenerationError>) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Queue `n` copies of the same error, simulating a backend that fails
    /// transiently before recovering.
    pub fn fail_times(&mut self, n: usize, error: GenerationError) {
        let mut script = self.script.lock().unwrap();
        for _ in 0..n {
            script.push_back(Err(error.clone()));
        }
    }

    /// Number of times `generate` was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl TextGenerator for MockGenerator {
    type Error = GenerationError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(result) = self.script.lock().unwrap().pop_front() {
            return result;
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}
