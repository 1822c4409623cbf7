//! Debrief Analyzer
//!
//! Turns raw post-mortem notes into a validated, structured analysis by
//! orchestrating the generation backend.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → TextGenerator → ResponseParser → AnalysisReport
//! ```
//!
//! The generator's content is non-deterministic; this crate makes the
//! *shape* of the result deterministic: every line of the input lands in
//! exactly one of the three buckets, every confidence is in [0, 1] and
//! backed by at least one supporting line, and every failure carries a
//! classification the reporting layer can render.
//!
//! # Example Usage
//!
//! ```
//! use debrief_analyzer::{AnalysisConfig, Analyzer};
//! use debrief_domain::InputDocument;
//! use debrief_llm::MockGenerator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reply = r#"{
//!     "unrecoverable_lines": [],
//!     "themes": [],
//!     "unclassified_lines": [ { "line": 1, "text": "We shipped on Friday" } ],
//!     "summary": { "synthesis": "One note.", "observations": [], "recommendations": [] }
//! }"#;
//!
//! let analyzer = Analyzer::new(MockGenerator::new(reply), AnalysisConfig::default());
//! let document = InputDocument::from_text("We shipped on Friday");
//!
//! let report = analyzer.analyze(&document).await?;
//! assert!(report.verify_partition(&document).is_ok());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod parser;
mod prompt;
mod reporter;
mod types;


pub use analyzer::Analyzer;
pub use config::AnalysisConfig;
pub use error::AnalyzerError;
pub use prompt::PromptBuilder;
pub use reporter::{describe, UserMessage};
