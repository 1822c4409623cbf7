//! Parse the backend reply into a validated report
//!
//! Strict structural parse first; when that fails, a bounded set of
//! recovery heuristics runs (fence stripping, prose trimming, numeric
//! coercion, percent normalization), each logged as a degradation. The
//! partition invariant is then repaired, never by dropping lines, and
//! every repair is flagged on the result.

use crate::error::AnalyzerError;
use crate::types::{
    LineRefCandidate, ReportCandidate, SummaryCandidate, SupportCandidate, ThemeCandidate,
};
use debrief_domain::{
    AnalysisSummary, Confidence, InputDocument, LineRef, SupportingLine, ThemeCluster,
};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Parsed and repaired report body, before run metadata is attached.
#[derive(Debug, Clone)]
pub(crate) struct ParsedReport {
    pub unrecoverable_lines: Vec<LineRef>,
    pub themes: Vec<ThemeCluster>,
    pub unclassified_lines: Vec<LineRef>,
    pub summary: AnalysisSummary,
    pub warnings: Vec<String>,
}

/// Parse the raw backend reply against the expected schema.
///
/// Never calls the backend; pure parsing and validation.
pub(crate) fn parse_response(
    raw: &str,
    document: &InputDocument,
) -> Result<ParsedReport, AnalyzerError> {
    let mut warnings = Vec::new();

    // 1. Strict structural parse of the reply as-is
    let candidate = match serde_json::from_str::<ReportCandidate>(raw.trim()) {
        Ok(candidate) => candidate,
        Err(strict_err) => recover(raw, strict_err, &mut warnings)?,
    };

    // 2. Shared validation and partition repair
    Ok(validate_and_repair(candidate, document, warnings))
}

/// Bounded recovery heuristics for a reply that failed the strict parse.
fn recover(
    raw: &str,
    strict_err: serde_json::Error,
    warnings: &mut Vec<String>,
) -> Result<ReportCandidate, AnalyzerError> {
    let Some(payload) = extract_payload(raw) else {
        return Err(AnalyzerError::MalformedResponse {
            detail: format!("no structured payload found ({})", strict_err),
            raw: raw.to_string(),
        });
    };

    if payload.trim() != raw.trim() {
        degrade(warnings, "stripped surrounding text around the JSON payload");
    }

    // The extracted payload may already be well-formed
    if let Ok(candidate) = serde_json::from_str::<ReportCandidate>(&payload) {
        return Ok(candidate);
    }

    let value: Value = serde_json::from_str(&payload).map_err(|e| {
        AnalyzerError::MalformedResponse {
            detail: format!("payload is not valid JSON: {}", e),
            raw: raw.to_string(),
        }
    })?;

    let Some(obj) = value.as_object() else {
        return Err(AnalyzerError::MalformedResponse {
            detail: "payload is not a JSON object".to_string(),
            raw: raw.to_string(),
        });
    };

    let unrecoverable_lines = match obj.get("unrecoverable_lines") {
        Some(v) => parse_line_refs(v, "unrecoverable_lines", warnings),
        None => {
            degrade(warnings, "missing field 'unrecoverable_lines', defaulted to empty");
            Vec::new()
        }
    };

    let themes = match obj.get("themes") {
        Some(v) => parse_themes(v, warnings),
        None => {
            degrade(warnings, "missing field 'themes', defaulted to empty");
            Vec::new()
        }
    };

    let unclassified_lines = match obj.get("unclassified_lines") {
        Some(v) => parse_line_refs(v, "unclassified_lines", warnings),
        None => {
            degrade(warnings, "missing field 'unclassified_lines', defaulted to empty");
            Vec::new()
        }
    };

    let summary = match obj.get("summary") {
        Some(v) => parse_summary(v, warnings),
        None => {
            degrade(warnings, "missing field 'summary', defaulted to empty");
            SummaryCandidate::default()
        }
    };

    Ok(ReportCandidate {
        unrecoverable_lines,
        themes,
        unclassified_lines,
        summary,
    })
}

/// Locate a JSON payload inside the reply: strip markdown code fences, or
/// slice from the first `{` to the last `}` when prose surrounds it.
fn extract_payload(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            return Some(after[..end].trim().to_string());
        }
    }

    let first = trimmed.find('{')?;
    let last = trimmed.rfind('}')?;
    if first < last {
        Some(trimmed[first..=last].to_string())
    } else {
        None
    }
}

fn parse_line_refs(value: &Value, field: &str, warnings: &mut Vec<String>) -> Vec<LineRefCandidate> {
    let Some(entries) = value.as_array() else {
        degrade(warnings, &format!("'{}' is not an array, defaulted to empty", field));
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            // Bare line numbers are tolerated alongside {line, text} objects
            if let Some(line) = coerce_usize(entry) {
                return Some(LineRefCandidate {
                    line,
                    text: String::new(),
                });
            }
            let obj = entry.as_object()?;
            let line = coerce_usize(obj.get("line")?)?;
            let text = obj
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(LineRefCandidate { line, text })
        })
        .collect()
}

fn parse_themes(value: &Value, warnings: &mut Vec<String>) -> Vec<ThemeCandidate> {
    let Some(entries) = value.as_array() else {
        degrade(warnings, "'themes' is not an array, defaulted to empty");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let obj = entry.as_object()?;
            let label = obj.get("label").and_then(Value::as_str)?.to_string();

            let confidence = match obj.get("confidence").and_then(coerce_f64_value) {
                Some((value, coerced)) => {
                    if coerced {
                        degrade(
                            warnings,
                            &format!("theme {} confidence coerced from string", idx),
                        );
                    }
                    value
                }
                None => {
                    warn!("Theme {} has no usable confidence; skipping", idx);
                    return None;
                }
            };

            let supporting_lines = obj
                .get("supporting_lines")
                .and_then(Value::as_array)
                .map(|lines| {
                    lines
                        .iter()
                        .filter_map(|line| {
                            let obj = line.as_object()?;
                            Some(SupportCandidate {
                                line: coerce_usize(obj.get("line")?)?,
                                quote: obj
                                    .get("quote")
                                    .and_then(Value::as_str)
                                    .unwrap_or_default()
                                    .to_string(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            Some(ThemeCandidate {
                label,
                description: obj
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                confidence,
                supporting_lines,
            })
        })
        .collect()
}

fn parse_summary(value: &Value, warnings: &mut Vec<String>) -> SummaryCandidate {
    let Some(obj) = value.as_object() else {
        degrade(warnings, "'summary' is not an object, defaulted to empty");
        return SummaryCandidate::default();
    };

    SummaryCandidate {
        synthesis: obj
            .get("synthesis")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        observations: string_list(obj.get("observations")),
        recommendations: string_list(obj.get("recommendations")),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Coerce a JSON value to f64, tolerating numeric-looking strings.
/// Returns the value and whether string coercion was applied.
fn coerce_f64_value(value: &Value) -> Option<(f64, bool)> {
    if let Some(n) = value.as_f64() {
        return Some((n, false));
    }
    value
        .as_str()
        .and_then(|s| s.trim().trim_end_matches('%').parse().ok())
        .map(|n| (n, true))
}

fn coerce_usize(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    value.as_str().and_then(|s| s.trim().parse().ok())
}

/// Validate the candidate against the document and repair the partition.
fn validate_and_repair(
    candidate: ReportCandidate,
    document: &InputDocument,
    mut warnings: Vec<String>,
) -> ParsedReport {
    let mut seen = BTreeSet::new();

    // Bucket order fixes duplicate precedence: unrecoverable, then themes
    // in reported order, then unclassified.
    let unrecoverable_lines: Vec<LineRef> = candidate
        .unrecoverable_lines
        .into_iter()
        .filter_map(|entry| {
            claim_line(entry.line, document, &mut seen, &mut warnings).map(|text| LineRef {
                line: entry.line,
                text: if entry.text.is_empty() { text } else { entry.text },
            })
        })
        .collect();

    let mut themes: Vec<ThemeCluster> = Vec::new();
    for (idx, theme) in candidate.themes.into_iter().enumerate() {
        let supporting_lines: Vec<SupportingLine> = theme
            .supporting_lines
            .into_iter()
            .filter_map(|entry| {
                claim_line(entry.line, document, &mut seen, &mut warnings).map(|text| {
                    SupportingLine {
                        line: entry.line,
                        quote: if entry.quote.is_empty() { text } else { entry.quote },
                    }
                })
            })
            .collect();

        if supporting_lines.is_empty() {
            degrade(
                &mut warnings,
                &format!(
                    "dropped theme '{}' (index {}): no valid supporting lines",
                    theme.label, idx
                ),
            );
            continue;
        }

        let confidence = normalize_confidence(theme.confidence, &theme.label, &mut warnings);
        themes.push(ThemeCluster {
            label: theme.label,
            description: theme.description,
            confidence,
            supporting_lines,
        });
    }

    let mut unclassified_lines: Vec<LineRef> = candidate
        .unclassified_lines
        .into_iter()
        .filter_map(|entry| {
            claim_line(entry.line, document, &mut seen, &mut warnings).map(|text| LineRef {
                line: entry.line,
                text: if entry.text.is_empty() { text } else { entry.text },
            })
        })
        .collect();

    // Partition repair: unaccounted lines default to unclassified, never
    // dropped.
    let mut defaulted = 0;
    for line in document.lines() {
        if !seen.contains(&line.index) {
            unclassified_lines.push(LineRef {
                line: line.index,
                text: line.text.clone(),
            });
            defaulted += 1;
        }
    }
    if defaulted > 0 {
        degrade(
            &mut warnings,
            &format!("{} unaccounted line(s) defaulted to unclassified", defaulted),
        );
    }
    unclassified_lines.sort_by_key(|l| l.line);

    ParsedReport {
        unrecoverable_lines,
        themes,
        unclassified_lines,
        summary: AnalysisSummary {
            synthesis: candidate.summary.synthesis,
            observations: candidate.summary.observations,
            recommendations: candidate.summary.recommendations,
        },
        warnings,
    }
}

/// Claim a line index for the current bucket. Returns the document text
/// when the claim succeeds; out-of-bounds and duplicate references are
/// rejected with a warning.
fn claim_line(
    line: usize,
    document: &InputDocument,
    seen: &mut BTreeSet<usize>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let Some(text) = document.text_of(line) else {
        degrade(warnings, &format!("dropped reference to unknown line {}", line));
        return None;
    };
    if !seen.insert(line) {
        degrade(
            warnings,
            &format!("line {} referenced more than once; kept first placement", line),
        );
        return None;
    }
    Some(text.to_string())
}

/// Normalize a reported confidence: percent-style values in (1, 100] are
/// scaled down, anything still out of range is clipped. Both repairs are
/// flagged.
fn normalize_confidence(raw: f64, label: &str, warnings: &mut Vec<String>) -> Confidence {
    let mut value = raw;
    if value > 1.0 && value <= 100.0 {
        value /= 100.0;
        degrade(
            warnings,
            &format!("theme '{}': percent-style confidence {} normalized", label, raw),
        );
    }

    let (confidence, clipped) = Confidence::clamped(value);
    if clipped {
        degrade(
            warnings,
            &format!(
                "theme '{}': confidence {} clipped to {}",
                label,
                raw,
                confidence.value()
            ),
        );
    }
    confidence
}

fn degrade(warnings: &mut Vec<String>, message: &str) {
    warn!("Response degradation: {}", message);
    warnings.push(message.to_string());
}
