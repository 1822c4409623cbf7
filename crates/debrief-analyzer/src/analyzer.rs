//! End-to-end analysis orchestration

use crate::config::AnalysisConfig;
use crate::error::AnalyzerError;
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use debrief_domain::{
    AnalysisMetadata, AnalysisReport, InputDocument, TextGenerator,
};
use debrief_llm::GenerationError;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

/// Evidence counts at or above this saturate the evidence factor.
const EVIDENCE_SATURATION: f64 = 3.0;

/// Drives the pipeline end to end: build prompt, invoke the generator,
/// parse the reply, derive secondary fields.
///
/// Retries live entirely inside the generation client; this layer adds
/// only the overall deadline. No failure is swallowed: every error
/// carries a classification reachable via `AnalyzerError::failure_record`.
pub struct Analyzer<G>
where
    G: TextGenerator<Error = GenerationError>,
{
    generator: Arc<G>,
    config: AnalysisConfig,
}

impl<G> Analyzer<G>
where
    G: TextGenerator<Error = GenerationError> + Send + Sync + 'static,
{
    /// Create a new analyzer over a generation backend.
    pub fn new(generator: G, config: AnalysisConfig) -> Self {
        Self {
            generator: Arc::new(generator),
            config,
        }
    }

    /// Analyze a document.
    ///
    /// Two runs over the same document may cluster differently (the
    /// generator is non-deterministic), but every successful result
    /// satisfies the partition and confidence invariants.
    pub async fn analyze(&self, document: &InputDocument) -> Result<AnalysisReport, AnalyzerError> {
        let started = Instant::now();

        self.config
            .validate()
            .map_err(AnalyzerError::Config)?;

        let prompt = PromptBuilder::new(document).build()?;
        debug!("Prompt length: {} chars", prompt.len());

        info!(
            "Starting analysis: {} lines, model '{}'",
            document.len(),
            self.config.model
        );

        let reply = timeout(self.config.total_deadline(), self.call_generator(&prompt))
            .await
            .map_err(|_| AnalyzerError::DeadlineExceeded)??;

        debug!("Reply length: {} chars", reply.len());

        let parsed = parse_response(&reply, document)?;
        let mut report = self.derive(parsed, document);

        report.metadata = AnalysisMetadata {
            model_name: self.config.model.clone(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            lines_total: document.len(),
        };

        info!(
            "Analysis complete: {} themes, {} unrecoverable, {} unclassified, {} warning(s)",
            report.themes.len(),
            report.unrecoverable_lines.len(),
            report.unclassified_lines.len(),
            report.warnings.len()
        );

        Ok(report)
    }

    /// Derive secondary fields from the parsed reply: evidence-weighted
    /// confidence, theme ordering, and a partition cross-check.
    fn derive(&self, parsed: crate::parser::ParsedReport, document: &InputDocument) -> AnalysisReport {
        let mut warnings = parsed.warnings;

        let mut themes = parsed.themes;
        for theme in &mut themes {
            let factor = evidence_factor(theme.supporting_lines.len());
            let effective = theme.confidence.scaled(factor);
            if effective != theme.confidence {
                debug!(
                    "Theme '{}': confidence {:.2} scaled to {:.2} ({} supporting line(s))",
                    theme.label,
                    theme.confidence.value(),
                    effective.value(),
                    theme.supporting_lines.len()
                );
            }
            theme.confidence = effective;
        }
        themes.sort_by(|a, b| {
            b.confidence
                .value()
                .partial_cmp(&a.confidence.value())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let report = AnalysisReport {
            unrecoverable_lines: parsed.unrecoverable_lines,
            themes,
            unclassified_lines: parsed.unclassified_lines,
            summary: parsed.summary,
            warnings: Vec::new(),
            metadata: AnalysisMetadata {
                model_name: String::new(),
                processing_time_ms: 0,
                timestamp: 0,
                lines_total: 0,
            },
        };

        // Cross-check between clusters and the line-level buckets; the
        // parser repairs the partition, so a violation here is a bug worth
        // surfacing rather than hiding.
        if let Err(violation) = report.verify_partition(document) {
            warn!("Partition violation survived repair: {:?}", violation);
            warnings.push(format!("partition cross-check failed: {:?}", violation));
        }

        AnalysisReport { warnings, ..report }
    }

    /// Call the generator on a blocking thread; the trait seam is sync.
    async fn call_generator(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let generator = Arc::clone(&self.generator);
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || {
            generator
                .generate(&prompt)
                .map_err(AnalyzerError::Generation)
        })
        .await
        .map_err(|e| {
            AnalyzerError::Generation(GenerationError::Fatal(format!("task join error: {}", e)))
        })?
    }
}

/// Evidence factor in [0.5, 1.0]: a cluster backed by a single line keeps
/// only part of its reported confidence; three or more lines keep it all.
fn evidence_factor(supporting_count: usize) -> f64 {
    0.5 + 0.5 * (supporting_count as f64 / EVIDENCE_SATURATION).min(1.0)
}
