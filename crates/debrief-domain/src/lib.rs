//! Debrief Domain Layer
//!
//! Core data model for post-mortem analysis. This crate has no
//! infrastructure dependencies and defines the value objects and trait
//! interfaces that every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **InputDocument**: the uploaded notes, split into ordered non-blank
//!   lines; a line's identity is its 1-based position in the original file
//! - **AnalysisReport**: the structured result - unrecoverable lines,
//!   theme clusters, unclassified lines, and a summary
//! - **Confidence**: a [0, 1] score tied to a cluster's supporting evidence
//! - **Partition invariant**: every document line lands in exactly one of
//!   the three line-level buckets
//! - **FailureRecord**: classified pipeline failure, consumed by the
//!   reporting layer
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure data and validation logic only
//! - Backend implementations live in other crates behind the
//!   `TextGenerator` trait

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod document;
pub mod failure;
pub mod report;
pub mod traits;

// Re-exports for convenience
pub use confidence::Confidence;
pub use document::{InputDocument, SourceLine};
pub use failure::{FailureKind, FailureRecord};
pub use report::{
    AnalysisMetadata, AnalysisReport, AnalysisSummary, LineRef, PartitionViolation,
    SupportingLine, ThemeCluster,
};
pub use traits::TextGenerator;
