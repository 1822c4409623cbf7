//! Configuration for the analysis pipeline

use debrief_llm::{GenerationConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one analysis run.
///
/// Combines the generation parameters with the retry bounds. Validation
/// rejects out-of-range values instead of clamping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model identifier
    pub model: String,

    /// Sampling temperature in [0, 2]
    pub temperature: f64,

    /// Cap on generated tokens
    pub max_output_tokens: u32,

    /// Timeout for a single backend request (seconds)
    pub request_timeout_secs: u64,

    /// Maximum generation attempts, including the initial call
    pub max_attempts: u32,

    /// Upper bound on total elapsed time per analysis, covering all
    /// retries (seconds)
    pub total_deadline_secs: u64,
}

impl Default for AnalysisConfig {
    /// Defaults matching the generation backend's documented defaults:
    /// gpt-4, temperature 0.3, 2048 tokens, 30 s per request, 4 attempts
    /// inside a 120 s deadline.
    fn default() -> Self {
        let generation = GenerationConfig::default();
        let retry = RetryPolicy::default();
        Self {
            model: generation.model,
            temperature: generation.temperature,
            max_output_tokens: generation.max_output_tokens,
            request_timeout_secs: generation.request_timeout_secs,
            max_attempts: retry.max_attempts,
            total_deadline_secs: retry.total_deadline.as_secs(),
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration, failing fast on out-of-range values.
    pub fn validate(&self) -> Result<(), String> {
        self.generation_config().validate().map_err(|e| e.to_string())?;
        self.retry_policy().validate()?;
        if self.request_timeout_secs > self.total_deadline_secs {
            return Err("request_timeout_secs cannot exceed total_deadline_secs".to_string());
        }
        Ok(())
    }

    /// The generation-backend view of this configuration.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// The retry-policy view of this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            total_deadline: self.total_deadline(),
            ..RetryPolicy::default()
        }
    }

    /// Total deadline as a Duration.
    pub fn total_deadline(&self) -> Duration {
        Duration::from_secs(self.total_deadline_secs)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
