//! Candidate types deserialized from the backend reply
//!
//! These mirror the requested output schema before validation. The parser
//! converts them into domain types, repairing what it can.

use serde::Deserialize;

/// Whole-reply candidate matching the requested schema.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReportCandidate {
    pub unrecoverable_lines: Vec<LineRefCandidate>,
    pub themes: Vec<ThemeCandidate>,
    pub unclassified_lines: Vec<LineRefCandidate>,
    pub summary: SummaryCandidate,
}

/// A line reference as reported by the model.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LineRefCandidate {
    pub line: usize,
    #[serde(default)]
    pub text: String,
}

/// A theme cluster as reported by the model.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ThemeCandidate {
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub confidence: f64,
    pub supporting_lines: Vec<SupportCandidate>,
}

/// A supporting quote as reported by the model.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SupportCandidate {
    pub line: usize,
    #[serde(default)]
    pub quote: String,
}

/// The summary block as reported by the model.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SummaryCandidate {
    #[serde(default)]
    pub synthesis: String,
    #[serde(default)]
    pub observations: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
