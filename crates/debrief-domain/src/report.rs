//! Structured analysis result model

use crate::confidence::Confidence;
use crate::document::InputDocument;
use std::collections::BTreeSet;

/// Reference to one document line, used for the unrecoverable and
/// unclassified buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// 1-based index in the original document
    pub line: usize,
    /// Original line text
    pub text: String,
}

/// One line of evidence backing a theme cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportingLine {
    /// 1-based index in the original document
    pub line: usize,
    /// Quoted text from that line
    pub quote: String,
}

/// A named recurring pattern with its supporting evidence.
///
/// A cluster with zero supporting lines is invalid: the confidence score
/// must reflect corroborating evidence, not exist independently of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeCluster {
    /// Short label for the pattern
    pub label: String,
    /// Longer description
    pub description: String,
    /// Evidence-backed confidence score
    pub confidence: Confidence,
    /// Lines corroborating the pattern, in document order
    pub supporting_lines: Vec<SupportingLine>,
}

/// Free-text synthesis plus key observations and recommendations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Concise synthesis of the whole document
    pub synthesis: String,
    /// Key observations called out by the analysis
    pub observations: Vec<String>,
    /// Ordered improvement suggestions
    pub recommendations: Vec<String>,
}

/// Metadata about one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisMetadata {
    /// Name of the generation model used
    pub model_name: String,
    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
    /// Unix timestamp when the analysis completed
    pub timestamp: u64,
    /// Number of non-blank lines in the source document
    pub lines_total: usize,
}

/// Aggregate analysis result, created once per pipeline run and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Lines judged to carry no extractable meaning
    pub unrecoverable_lines: Vec<LineRef>,
    /// Recurring theme clusters
    pub themes: Vec<ThemeCluster>,
    /// Meaningful lines absorbed by no cluster
    pub unclassified_lines: Vec<LineRef>,
    /// Synthesis, observations, and recommendations
    pub summary: AnalysisSummary,
    /// Data-quality warnings attached during structural repair
    pub warnings: Vec<String>,
    /// Run metadata
    pub metadata: AnalysisMetadata,
}

/// Violation of the line-partition invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionViolation {
    /// A document line appears in no bucket
    Missing(usize),
    /// A document line appears in more than one place
    Duplicated(usize),
    /// A referenced line does not exist in the document
    Unknown(usize),
}

impl AnalysisReport {
    /// All line indices referenced by the report, in bucket order:
    /// unrecoverable, then each theme's support, then unclassified.
    pub fn referenced_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        indices.extend(self.unrecoverable_lines.iter().map(|l| l.line));
        for theme in &self.themes {
            indices.extend(theme.supporting_lines.iter().map(|s| s.line));
        }
        indices.extend(self.unclassified_lines.iter().map(|l| l.line));
        indices
    }

    /// Check the partition invariant against the source document: every
    /// document line appears exactly once across the three buckets.
    ///
    /// Returns the first violation found.
    pub fn verify_partition(&self, document: &InputDocument) -> Result<(), PartitionViolation> {
        let mut seen = BTreeSet::new();
        for index in self.referenced_indices() {
            if !document.contains_index(index) {
                return Err(PartitionViolation::Unknown(index));
            }
            if !seen.insert(index) {
                return Err(PartitionViolation::Duplicated(index));
            }
        }
        for index in document.indices() {
            if !seen.contains(&index) {
                return Err(PartitionViolation::Missing(index));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> InputDocument {
        InputDocument::from_text("one\ntwo\nthree")
    }

    fn metadata() -> AnalysisMetadata {
        AnalysisMetadata {
            model_name: "test".to_string(),
            processing_time_ms: 0,
            timestamp: 0,
            lines_total: 3,
        }
    }

    fn report(
        unrecoverable: Vec<usize>,
        supporting: Vec<usize>,
        unclassified: Vec<usize>,
    ) -> AnalysisReport {
        AnalysisReport {
            unrecoverable_lines: unrecoverable
                .into_iter()
                .map(|line| LineRef {
                    line,
                    text: String::new(),
                })
                .collect(),
            themes: if supporting.is_empty() {
                Vec::new()
            } else {
                vec![ThemeCluster {
                    label: "theme".to_string(),
                    description: String::new(),
                    confidence: Confidence::new(0.5),
                    supporting_lines: supporting
                        .into_iter()
                        .map(|line| SupportingLine {
                            line,
                            quote: String::new(),
                        })
                        .collect(),
                }]
            },
            unclassified_lines: unclassified
                .into_iter()
                .map(|line| LineRef {
                    line,
                    text: String::new(),
                })
                .collect(),
            summary: AnalysisSummary::default(),
            warnings: Vec::new(),
            metadata: metadata(),
        }
    }

    #[test]
    fn test_partition_holds() {
        let r = report(vec![1], vec![2], vec![3]);
        assert!(r.verify_partition(&doc()).is_ok());
    }

    #[test]
    fn test_partition_missing_line() {
        let r = report(vec![1], vec![2], vec![]);
        assert_eq!(
            r.verify_partition(&doc()),
            Err(PartitionViolation::Missing(3))
        );
    }

    #[test]
    fn test_partition_duplicated_line() {
        let r = report(vec![1, 2], vec![2], vec![3]);
        assert_eq!(
            r.verify_partition(&doc()),
            Err(PartitionViolation::Duplicated(2))
        );
    }

    #[test]
    fn test_partition_unknown_line() {
        let r = report(vec![1], vec![2], vec![3, 9]);
        assert_eq!(
            r.verify_partition(&doc()),
            Err(PartitionViolation::Unknown(9))
        );
    }

    #[test]
    fn test_referenced_indices_bucket_order() {
        let r = report(vec![3], vec![1], vec![2]);
        assert_eq!(r.referenced_indices(), vec![3, 1, 2]);
    }
}
