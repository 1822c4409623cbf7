//! Trait definitions for external interactions
//!
//! These traits define the boundary between the analysis pipeline and
//! infrastructure. Implementations live in other crates.

/// Trait for the non-deterministic text-generation backend.
///
/// The orchestrator depends on this capability, not on a concrete client,
/// so tests substitute deterministic fakes producing canned responses.
///
/// Implemented by the infrastructure layer (debrief-llm).
pub trait TextGenerator {
    /// Error type for generation operations
    type Error;

    /// Generate a completion for the given prompt.
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}
