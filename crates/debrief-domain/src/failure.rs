//! Pipeline failure classification

use std::fmt;

/// Classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Input document was empty or whitespace-only
    EmptyInput,
    /// Invalid or missing configuration (credential, model, parameters)
    Configuration,
    /// Credential rejected by the generation backend
    Auth,
    /// Backend rate limit exceeded
    RateLimit,
    /// Transient backend failure that outlived the retry budget
    TransientService,
    /// Backend failure that will not resolve on retry
    FatalService,
    /// Backend reply could not be parsed into the expected structure
    MalformedResponse,
    /// Anything that escaped classification
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::EmptyInput => "empty input",
            FailureKind::Configuration => "configuration",
            FailureKind::Auth => "authentication",
            FailureKind::RateLimit => "rate limit",
            FailureKind::TransientService => "transient service failure",
            FailureKind::FatalService => "fatal service failure",
            FailureKind::MalformedResponse => "malformed response",
            FailureKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// A classified pipeline failure, created when any stage fails and
/// consumed by the reporting layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable detail
    pub detail: String,
    /// Raw diagnostic payload (e.g. the unparseable backend reply)
    pub raw: Option<String>,
}

impl FailureRecord {
    /// Create a failure record without a raw payload.
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            raw: None,
        }
    }

    /// Attach the raw diagnostic payload.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}
