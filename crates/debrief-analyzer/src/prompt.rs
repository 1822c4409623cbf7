//! Prompt engineering for post-mortem analysis

use crate::error::AnalyzerError;
use debrief_domain::InputDocument;

/// Builds the single instruction payload sent to the generation backend.
pub struct PromptBuilder<'a> {
    document: &'a InputDocument,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for a document.
    pub fn new(document: &'a InputDocument) -> Self {
        Self { document }
    }

    /// Build the complete analysis prompt.
    ///
    /// Fails with `EmptyInput` when the document has no non-blank lines,
    /// before any network call can be attempted. No side effects.
    pub fn build(&self) -> Result<String, AnalyzerError> {
        if self.document.is_empty() {
            return Err(AnalyzerError::EmptyInput);
        }

        let mut prompt = String::new();

        // 1. Instruction and output schema
        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. The numbered document lines
        prompt.push_str("Post-mortem lines (number: text):\n");
        prompt.push_str("---\n");
        for line in self.document.lines() {
            prompt.push_str(&format!("{}: {}\n", line.index, line.text));
        }
        prompt.push_str("---\n\n");

        // 3. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        Ok(prompt)
    }
}

const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the numbered post-mortem lines below and produce a JSON object with exactly these fields:

{
  "unrecoverable_lines": [
    { "line": <line number>, "text": "<original text>" }
  ],
  "themes": [
    {
      "label": "<short name for the recurring pattern>",
      "description": "<one or two sentences>",
      "confidence": <0.0-1.0>,
      "supporting_lines": [
        { "line": <line number>, "quote": "<text quoted from that line>" }
      ]
    }
  ],
  "unclassified_lines": [
    { "line": <line number>, "text": "<original text>" }
  ],
  "summary": {
    "synthesis": "<concise summary of the whole document>",
    "observations": ["<key observation>"],
    "recommendations": ["<improvement suggestion>"]
  }
}

Rules:
- unrecoverable_lines: lines with no extractable meaning (timestamps, separators, boilerplate)
- themes: recurring patterns; every theme needs at least one supporting line
- confidence must be a number between 0.0 and 1.0 reflecting how strongly the supporting lines corroborate the theme
- unclassified_lines: meaningful lines that fit no theme
- Every input line number must appear in exactly one place: unrecoverable_lines, one theme's supporting_lines, or unclassified_lines. Account for every line exactly once; never drop a line and never list it twice."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format: a single JSON object with the fields unrecoverable_lines, themes, unclassified_lines, summary.

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_fails_fast() {
        let doc = InputDocument::from_text("   \n\n");
        let result = PromptBuilder::new(&doc).build();
        assert!(matches!(result, Err(AnalyzerError::EmptyInput)));
    }

    #[test]
    fn test_prompt_includes_numbered_lines() {
        let doc = InputDocument::from_text("deploy failed\n\nrollback was slow");
        let prompt = PromptBuilder::new(&doc).build().unwrap();
        assert!(prompt.contains("1: deploy failed"));
        assert!(prompt.contains("3: rollback was slow"));
    }

    #[test]
    fn test_prompt_includes_schema_fields() {
        let doc = InputDocument::from_text("a line");
        let prompt = PromptBuilder::new(&doc).build().unwrap();
        assert!(prompt.contains("unrecoverable_lines"));
        assert!(prompt.contains("supporting_lines"));
        assert!(prompt.contains("unclassified_lines"));
        assert!(prompt.contains("recommendations"));
        assert!(prompt.contains("0.0 and 1.0"));
    }

    #[test]
    fn test_prompt_includes_accounting_instruction() {
        let doc = InputDocument::from_text("a line");
        let prompt = PromptBuilder::new(&doc).build().unwrap();
        assert!(prompt.contains("exactly one place"));
        assert!(prompt.contains("Account for every line exactly once"));
    }

    #[test]
    fn test_prompt_includes_format_reminder() {
        let doc = InputDocument::from_text("a line");
        let prompt = PromptBuilder::new(&doc).build().unwrap();
        assert!(prompt.contains("ONLY valid JSON"));
    }
}
