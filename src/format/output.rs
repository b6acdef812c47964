//! Machine-readable output and the preview change listing.

use crate::model::{ResultSet, Suite, ThresholdSeries, Verdict};
use crate::report::{FieldMiss, LineChange, PatchOutcome};
use serde::Serialize;
use std::path::Path;

/// One comparison as emitted in JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    pub baseline_ms: f64,
    pub candidate_ms: f64,
    pub speedup: f64,
    pub verdict: Verdict,
}

/// JSON document printed by `run` and `apply` under `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct PatchSummary<'a> {
    pub report: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    pub written: bool,
    pub comparisons: Vec<ComparisonRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<&'a ThresholdSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_ms: Option<f64>,
    pub changes: &'a [LineChange],
    pub misses: &'a [FieldMiss],
}

impl<'a> PatchSummary<'a> {
    #[must_use]
    pub fn new(
        suite: &Suite,
        results: &'a ResultSet,
        outcome: &'a PatchOutcome,
        report: &Path,
        written: bool,
    ) -> Self {
        let comparisons = suite
            .comparisons
            .iter()
            .filter_map(|def| {
                results.comparison(&def.key).map(|result| ComparisonRow {
                    key: def.key.clone(),
                    baseline_ms: result.baseline_ms,
                    candidate_ms: result.candidate_ms,
                    speedup: (result.speedup() * 100.0).round() / 100.0,
                    verdict: result.verdict(),
                })
            })
            .collect();

        Self {
            report: report.display().to_string(),
            results: None,
            written,
            comparisons,
            threshold: results.threshold.as_ref(),
            startup_ms: results.startup_ms,
            changes: &outcome.changes,
            misses: &outcome.misses,
        }
    }

    #[must_use]
    pub fn with_results_path(mut self, path: &Path) -> Self {
        self.results = Some(path.display().to_string());
        self
    }
}

/// Human listing of line changes, as shown by a dry run.
#[must_use]
pub fn render_changes(changes: &[LineChange]) -> String {
    if changes.is_empty() {
        return "No changes.".to_string();
    }

    let mut out = format!("{} line(s) would change:", changes.len());
    for change in changes {
        out.push_str(&format!(
            "\n  L{:<5} {}\n    - {}\n    + {}",
            change.line,
            change.field,
            change.before.trim(),
            change.after.trim()
        ));
    }
    out
}

/// Human listing of fields that could not be located.
#[must_use]
pub fn render_misses(misses: &[FieldMiss]) -> Option<String> {
    if misses.is_empty() {
        return None;
    }
    let names: Vec<String> = misses.iter().map(|miss| miss.field.to_string()).collect();
    Some(format!("Not found in report: {}", names.join(", ")))
}
