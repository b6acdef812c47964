//! Result aggregation across the whole suite.
//!
//! Runs every benchmark once, in order, and reduces the extracted samples
//! into a [`ResultSet`]. Failed runs and partial samples contribute nothing.
//! Also owns the JSON snapshot written next to the report.

use crate::error::{CopybenchError, Result};
use crate::extract::{MeasurementSample, parse_startup, parse_times};
use crate::model::{
    ComparisonResult, ResultSet, Suite, ThresholdSeries, is_valid_duration, round_tenth,
};
use crate::runner::BenchRunner;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Observer for per-benchmark progress.
pub trait RunObserver {
    fn started(&mut self, _id: &str) {}
    fn finished(&mut self, _id: &str, _ok: bool) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl RunObserver for Silent {}

/// Run the whole suite and reduce it into a [`ResultSet`].
pub fn collect_results<R: BenchRunner, O: RunObserver>(
    runner: &mut R,
    suite: &Suite,
    observer: &mut O,
) -> ResultSet {
    let mut results = ResultSet::default();

    for def in &suite.comparisons {
        let Some(sample) = run_and_parse(runner, &def.id, observer) else {
            continue;
        };
        let baseline = sample.get(&def.baseline_label);
        let candidate = sample.get(&def.candidate_label);
        match (baseline, candidate) {
            (Some(baseline), Some(candidate)) => {
                if let Some(pair) = ComparisonResult::new(baseline, candidate) {
                    debug!(key = %def.key, baseline_ms = pair.baseline_ms, candidate_ms = pair.candidate_ms, "Recorded comparison");
                    results.comparisons.insert(def.key.clone(), pair);
                } else {
                    warn!(key = %def.key, baseline, candidate, "Discarding non-positive comparison");
                }
            }
            _ => {
                warn!(
                    key = %def.key,
                    baseline_found = baseline.is_some(),
                    candidate_found = candidate.is_some(),
                    "Discarding partial comparison"
                );
            }
        }
    }

    if let Some(sample) = run_and_parse(runner, &suite.grouped.id, observer) {
        let series: ThresholdSeries = suite
            .grouped
            .load_sizes
            .iter()
            .filter_map(|size| {
                sample
                    .get(&suite.grouped.label_for(*size))
                    .map(|ms| (*size, round_tenth(ms)))
            })
            .collect();
        if series.is_empty() {
            warn!(bench = %suite.grouped.id, "No load-size measurements found");
        } else {
            debug!(entries = series.len(), "Recorded threshold series");
            results.threshold = Some(series);
        }
    }

    if let Some(output) = run_raw(runner, &suite.scalar.id, observer) {
        match parse_startup(&output) {
            Some(ms) if ms > 0.0 => results.startup_ms = Some(round_tenth(ms)),
            _ => warn!(bench = %suite.scalar.id, metric = %suite.scalar.name, "Scalar metric not found"),
        }
    }

    info!(
        comparisons = results.comparisons.len(),
        threshold = results.threshold.is_some(),
        startup = results.startup_ms.is_some(),
        "Collected benchmark results"
    );
    results
}

fn run_raw<R: BenchRunner, O: RunObserver>(
    runner: &mut R,
    id: &str,
    observer: &mut O,
) -> Option<String> {
    observer.started(id);
    match runner.run(id) {
        Ok(output) => {
            observer.finished(id, true);
            Some(output)
        }
        Err(failure) => {
            warn!(bench = id, error = %failure, "Benchmark failed");
            observer.finished(id, false);
            None
        }
    }
}

fn run_and_parse<R: BenchRunner, O: RunObserver>(
    runner: &mut R,
    id: &str,
    observer: &mut O,
) -> Option<MeasurementSample> {
    run_raw(runner, id, observer).map(|output| parse_times(&output))
}

/// On-disk snapshot of one run.
///
/// Fields are spelled out rather than flattened from [`ResultSet`] so the
/// integer load-size keys deserialize from their JSON string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub comparisons: BTreeMap<String, ComparisonResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_ms: Option<f64>,
}

impl ResultSnapshot {
    #[must_use]
    pub fn new(results: ResultSet) -> Self {
        Self {
            generated_at: Utc::now(),
            comparisons: results.comparisons,
            threshold: results.threshold,
            startup_ms: results.startup_ms,
        }
    }

    /// Convert back into a [`ResultSet`], dropping values a run could never
    /// have recorded: pairs that are not both positive, and threshold or
    /// startup durations that are not finite and positive.
    #[must_use]
    pub fn into_results(self) -> ResultSet {
        let comparisons = self
            .comparisons
            .into_iter()
            .filter_map(|(key, pair)| {
                let valid = ComparisonResult::new(pair.baseline_ms, pair.candidate_ms);
                if valid.is_none() {
                    warn!(
                        key = %key,
                        baseline_ms = pair.baseline_ms,
                        candidate_ms = pair.candidate_ms,
                        "Dropping invalid comparison from snapshot"
                    );
                }
                valid.map(|pair| (key, pair))
            })
            .collect();

        let threshold = self.threshold.and_then(|series| {
            let kept: ThresholdSeries = series
                .iter()
                .filter(|(size, ms)| {
                    let ok = is_valid_duration(*ms);
                    if !ok {
                        warn!(size, ms, "Dropping invalid threshold entry from snapshot");
                    }
                    ok
                })
                .collect();
            (!kept.is_empty()).then_some(kept)
        });

        let startup_ms = self.startup_ms.filter(|ms| {
            let ok = is_valid_duration(*ms);
            if !ok {
                warn!(ms, "Dropping invalid startup value from snapshot");
            }
            ok
        });

        ResultSet {
            comparisons,
            threshold,
            startup_ms,
        }
    }
}

/// Write the snapshot as pretty JSON (temp file, then rename).
///
/// # Errors
///
/// Returns an error if the file cannot be written or renamed into place.
pub fn write_snapshot(snapshot: &ResultSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writeln!(writer)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| CopybenchError::Io(e.into_error()))?
        .sync_all()?;

    fs::rename(&temp_path, path)?;
    debug!(path = %path.display(), "Wrote results snapshot");
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`].
///
/// # Errors
///
/// Returns `SnapshotNotFound` if the file is missing and `SnapshotInvalid`
/// if it does not parse.
pub fn read_snapshot(path: &Path) -> Result<ResultSnapshot> {
    if !path.exists() {
        return Err(CopybenchError::SnapshotNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CopybenchError::SnapshotInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
