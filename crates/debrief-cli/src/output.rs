//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use debrief_analyzer::UserMessage;
use debrief_domain::{AnalysisReport, LineRef};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Sectioned human-readable output
    Table,
    /// JSON document
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a full analysis report.
    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_report_json(report),
            OutputFormat::Table => Ok(self.format_report_table(report)),
        }
    }

    fn format_report_json(&self, report: &AnalysisReport) -> Result<String> {
        let themes: Vec<serde_json::Value> = report
            .themes
            .iter()
            .map(|theme| {
                serde_json::json!({
                    "label": theme.label,
                    "description": theme.description,
                    "confidence": theme.confidence.value(),
                    "supporting_lines": theme
                        .supporting_lines
                        .iter()
                        .map(|s| serde_json::json!({ "line": s.line, "quote": s.quote }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        let line_refs = |lines: &[LineRef]| -> Vec<serde_json::Value> {
            lines
                .iter()
                .map(|l| serde_json::json!({ "line": l.line, "text": l.text }))
                .collect()
        };

        let value = serde_json::json!({
            "unrecoverable_lines": line_refs(&report.unrecoverable_lines),
            "themes": themes,
            "unclassified_lines": line_refs(&report.unclassified_lines),
            "summary": {
                "synthesis": report.summary.synthesis,
                "observations": report.summary.observations,
                "recommendations": report.summary.recommendations,
            },
            "warnings": report.warnings,
            "metadata": {
                "model_name": report.metadata.model_name,
                "processing_time_ms": report.metadata.processing_time_ms,
                "timestamp": report.metadata.timestamp,
                "lines_total": report.metadata.lines_total,
            },
        });

        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_report_table(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();

        out.push_str(&self.heading("Unrecoverable Lines"));
        if report.unrecoverable_lines.is_empty() {
            out.push_str("All lines had recoverable meaning.\n");
        } else {
            for line in &report.unrecoverable_lines {
                out.push_str(&format!("  {}: {}\n", line.line, line.text));
            }
        }

        out.push_str(&self.heading("Common Themes"));
        if report.themes.is_empty() {
            out.push_str("No common themes identified.\n");
        } else {
            out.push_str(&self.themes_table(report));
        }

        out.push_str(&self.heading("Unclassified Lines"));
        if report.unclassified_lines.is_empty() {
            out.push_str("All meaningful lines were absorbed by a theme.\n");
        } else {
            for line in &report.unclassified_lines {
                out.push_str(&format!("  {}: {}\n", line.line, line.text));
            }
        }

        out.push_str(&self.heading("Summary"));
        out.push_str(&report.summary.synthesis);
        out.push('\n');
        if !report.summary.observations.is_empty() {
            out.push_str(&self.heading("Key Observations"));
            for obs in &report.summary.observations {
                out.push_str(&format!("  - {}\n", obs));
            }
        }
        if !report.summary.recommendations.is_empty() {
            out.push_str(&self.heading("Recommendations"));
            for rec in &report.summary.recommendations {
                out.push_str(&format!("  - {}\n", rec));
            }
        }

        if !report.warnings.is_empty() {
            out.push_str(&self.heading("Data-Quality Warnings"));
            for warning in &report.warnings {
                out.push_str(&format!("  ! {}\n", self.colorize(warning, "yellow")));
            }
        }

        out.push_str(&format!(
            "\nAnalyzed {} line(s) with {} in {} ms.\n",
            report.metadata.lines_total,
            report.metadata.model_name,
            report.metadata.processing_time_ms
        ));

        out
    }

    fn themes_table(&self, report: &AnalysisReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Theme", "Confidence", "Support", "Description"]);

        for theme in &report.themes {
            builder.push_record([
                theme.label.as_str(),
                &format!("{:.2}", theme.confidence.value()),
                &theme.supporting_lines.len().to_string(),
                theme.description.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut out = table.to_string();
        out.push('\n');
        for theme in &report.themes {
            out.push_str(&format!("\n{}\n", self.colorize(&theme.label, "cyan")));
            for support in &theme.supporting_lines {
                out.push_str(&format!("  {}: \"{}\"\n", support.line, support.quote));
            }
        }
        out
    }

    /// Format a pipeline failure: short category and hint by default, full
    /// diagnostic detail on demand.
    pub fn format_failure(&self, message: &UserMessage, verbose: bool) -> String {
        let mut out = format!(
            "{} {}\n{}\n",
            self.colorize("✗", "red"),
            self.colorize(&message.category, "red"),
            message.hint
        );

        if verbose {
            out.push_str(&format!("\nDetail: {}\n", message.detail));
            if let Some(raw) = &message.raw {
                out.push_str(&format!("Raw response:\n{}\n", raw));
            }
        } else {
            out.push_str("(run with --verbose for the full diagnostic detail)\n");
        }

        out
    }

    fn heading(&self, title: &str) -> String {
        format!("\n{}\n", self.colorize(title, "bold"))
    }

    fn colorize(&self, text: &str, style: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        match style {
            "red" => text.red().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "bold" => text.bold().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debrief_domain::{
        AnalysisMetadata, AnalysisSummary, Confidence, SupportingLine, ThemeCluster,
    };

    fn report() -> AnalysisReport {
        AnalysisReport {
            unrecoverable_lines: vec![LineRef {
                line: 1,
                text: "---".to_string(),
            }],
            themes: vec![ThemeCluster {
                label: "Alert gaps".to_string(),
                description: "Alerts did not fire.".to_string(),
                confidence: Confidence::new(0.75),
                supporting_lines: vec![SupportingLine {
                    line: 2,
                    quote: "nobody was paged".to_string(),
                }],
            }],
            unclassified_lines: vec![LineRef {
                line: 3,
                text: "misc note".to_string(),
            }],
            summary: AnalysisSummary {
                synthesis: "Alerting needs work.".to_string(),
                observations: vec!["Pages were silent".to_string()],
                recommendations: vec!["Audit alert routes".to_string()],
            },
            warnings: vec!["1 unaccounted line(s) defaulted to unclassified".to_string()],
            metadata: AnalysisMetadata {
                model_name: "gpt-4".to_string(),
                processing_time_ms: 1234,
                timestamp: 0,
                lines_total: 3,
            },
        }
    }

    #[test]
    fn test_table_output_contains_sections() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let out = formatter.format_report(&report()).unwrap();

        assert!(out.contains("Unrecoverable Lines"));
        assert!(out.contains("Common Themes"));
        assert!(out.contains("Alert gaps"));
        assert!(out.contains("nobody was paged"));
        assert!(out.contains("Unclassified Lines"));
        assert!(out.contains("Audit alert routes"));
        assert!(out.contains("Data-Quality Warnings"));
        assert!(out.contains("gpt-4"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let out = formatter.format_report(&report()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["themes"][0]["label"], "Alert gaps");
        assert_eq!(value["themes"][0]["confidence"], 0.75);
        assert_eq!(value["metadata"]["lines_total"], 3);
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_failure_hides_detail_unless_verbose() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let message = UserMessage {
            category: "Unusable response".to_string(),
            hint: "try again".to_string(),
            detail: "no JSON payload".to_string(),
            raw: Some("free text".to_string()),
        };

        let quiet = formatter.format_failure(&message, false);
        assert!(quiet.contains("Unusable response"));
        assert!(!quiet.contains("no JSON payload"));

        let verbose = formatter.format_failure(&message, true);
        assert!(verbose.contains("no JSON payload"));
        assert!(verbose.contains("free text"));
    }
}
