//! Map failure records to user-facing messages

use debrief_domain::{FailureKind, FailureRecord};

/// Short user-facing description of a pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    /// Short category label
    pub category: String,
    /// Remediation hint
    pub hint: String,
    /// Full diagnostic detail, shown on demand
    pub detail: String,
    /// Raw diagnostic payload, when one exists
    pub raw: Option<String>,
}

/// Describe a failure for display. Total: every classification maps to a
/// category and hint, with a generic fallback for anything unclassified.
pub fn describe(failure: &FailureRecord) -> UserMessage {
    let (category, hint) = match failure.kind {
        FailureKind::EmptyInput => (
            "Empty input",
            "The uploaded file has no usable lines; upload a file with content.",
        ),
        FailureKind::Configuration => (
            "Configuration problem",
            "Check the analysis settings and the API key environment variable.",
        ),
        FailureKind::Auth => (
            "Authentication failed",
            "Check that the API key is valid and has not expired.",
        ),
        FailureKind::RateLimit => (
            "Rate limited",
            "The service is throttling requests; wait a moment and retry.",
        ),
        FailureKind::TransientService => (
            "Service unavailable",
            "Likely a temporary outage; retrying usually resolves this.",
        ),
        FailureKind::FatalService => (
            "Service rejected the request",
            "Retrying will not help; try a different model or configuration.",
        ),
        FailureKind::MalformedResponse => (
            "Unusable response",
            "The model returned an unexpected format; try again or switch models.",
        ),
        FailureKind::Unknown => (
            "Unexpected error",
            "Something went wrong outside the known failure classes; see the detail.",
        ),
    };

    UserMessage {
        category: category.to_string(),
        hint: hint.to_string(),
        detail: failure.detail.clone(),
        raw: failure.raw.clone(),
    }
}
