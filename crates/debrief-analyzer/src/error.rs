//! Error types for the analysis pipeline

use debrief_domain::{FailureKind, FailureRecord};
use debrief_llm::GenerationError;
use thiserror::Error;

/// Errors that can occur during analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Input document was empty or whitespace-only
    #[error("Input document is empty")]
    EmptyInput,

    /// Invalid analysis configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation backend error, already classified by the client
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Total elapsed-time bound exceeded, covering all retries
    #[error("Analysis deadline exceeded")]
    DeadlineExceeded,

    /// Backend reply could not be parsed into the expected structure
    #[error("Malformed response: {detail}")]
    MalformedResponse {
        /// What made the reply unusable
        detail: String,
        /// The raw reply, kept for diagnostics
        raw: String,
    },
}

impl AnalyzerError {
    /// Classify this error into a failure record for the reporting layer.
    pub fn failure_record(&self) -> FailureRecord {
        match self {
            AnalyzerError::EmptyInput => {
                FailureRecord::new(FailureKind::EmptyInput, self.to_string())
            }
            AnalyzerError::Config(_) => {
                FailureRecord::new(FailureKind::Configuration, self.to_string())
            }
            AnalyzerError::DeadlineExceeded => {
                FailureRecord::new(FailureKind::TransientService, self.to_string())
            }
            AnalyzerError::MalformedResponse { detail, raw } => {
                FailureRecord::new(FailureKind::MalformedResponse, detail.clone())
                    .with_raw(raw.clone())
            }
            AnalyzerError::Generation(e) => {
                let kind = match e {
                    GenerationError::Auth(_) => FailureKind::Auth,
                    GenerationError::RateLimited { .. } => FailureKind::RateLimit,
                    GenerationError::Unavailable(_)
                    | GenerationError::RetriesExhausted { .. } => FailureKind::TransientService,
                    GenerationError::Fatal(_) | GenerationError::InvalidResponse(_) => {
                        FailureKind::FatalService
                    }
                    GenerationError::Config(_) => FailureKind::Configuration,
                };
                FailureRecord::new(kind, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_classification() {
        let record = AnalyzerError::EmptyInput.failure_record();
        assert_eq!(record.kind, FailureKind::EmptyInput);
    }

    #[test]
    fn test_malformed_response_keeps_raw_payload() {
        let err = AnalyzerError::MalformedResponse {
            detail: "no JSON payload".to_string(),
            raw: "sorry, I cannot".to_string(),
        };
        let record = err.failure_record();
        assert_eq!(record.kind, FailureKind::MalformedResponse);
        assert_eq!(record.raw.as_deref(), Some("sorry, I cannot"));
    }

    #[test]
    fn test_generation_error_classification() {
        let cases = [
            (GenerationError::Auth("401".to_string()), FailureKind::Auth),
            (
                GenerationError::RateLimited {
                    detail: "429".to_string(),
                    retry_after_secs: None,
                },
                FailureKind::RateLimit,
            ),
            (
                GenerationError::RetriesExhausted {
                    attempts: 4,
                    last_error: "503".to_string(),
                },
                FailureKind::TransientService,
            ),
            (
                GenerationError::Fatal("policy".to_string()),
                FailureKind::FatalService,
            ),
            (
                GenerationError::Config("temp".to_string()),
                FailureKind::Configuration,
            ),
        ];

        for (error, expected) in cases {
            let record = AnalyzerError::Generation(error).failure_record();
            assert_eq!(record.kind, expected);
        }
    }

    #[test]
    fn test_deadline_maps_to_transient() {
        let record = AnalyzerError::DeadlineExceeded.failure_record();
        assert_eq!(record.kind, FailureKind::TransientService);
    }
}
