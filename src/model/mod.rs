//! Core data types for `copybench`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `BenchmarkDefinition` - One named measurement and the labels it emits
//! - `Suite` - The fixed battery of benchmarks, built once at startup
//! - `ComparisonResult` - Baseline/candidate timing pair for one result key
//! - `ThresholdSeries` - Durations keyed by load size
//! - `ResultSet` - Everything one run produced, handed to the report patcher
//! - `Verdict` - Qualitative classification of a speedup

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Speedup at or above which the candidate counts as faster.
pub const FAST_THRESHOLD: f64 = 1.05;
/// Speedup below which the candidate counts as slower.
pub const PAR_THRESHOLD: f64 = 0.95;

/// Round a duration to one decimal place, half-up.
///
/// Durations are parsed from decimal text, so `x.x5` usually lands a hair
/// below the midpoint in binary; the nudge puts it back on the midpoint.
#[must_use]
pub fn round_tenth(ms: f64) -> f64 {
    let scaled = ms * 10.0;
    (scaled + 1e-9).round() / 10.0
}

/// A duration the report can display: finite and strictly positive.
#[must_use]
pub fn is_valid_duration(ms: f64) -> bool {
    ms.is_finite() && ms > 0.0
}

/// One benchmark of the comparison battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    /// Identifier passed to the benchmark program (a test name).
    pub id: String,
    /// Unique key routing the result to a report anchor.
    pub key: String,
    /// Label of the reference series (GNU cp).
    pub baseline_label: String,
    /// Label of the series under test (our cp).
    pub candidate_label: String,
}

impl BenchmarkDefinition {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        baseline_label: impl Into<String>,
        candidate_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            baseline_label: baseline_label.into(),
            candidate_label: candidate_label.into(),
        }
    }
}

/// The grouped benchmark sweeping a fixed set of load sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedBenchmark {
    pub id: String,
    /// Known load sizes, in report order.
    pub load_sizes: Vec<u32>,
    /// Measurement label with `{n}` standing in for the load size.
    pub label_template: String,
}

impl GroupedBenchmark {
    /// Measurement label emitted for one load size.
    #[must_use]
    pub fn label_for(&self, size: u32) -> String {
        self.label_template.replace("{n}", &size.to_string())
    }
}

/// The benchmark producing a single scalar duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarBenchmark {
    pub id: String,
    pub name: String,
}

/// Immutable benchmark battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    pub comparisons: Vec<BenchmarkDefinition>,
    pub grouped: GroupedBenchmark,
    pub scalar: ScalarBenchmark,
}

impl Suite {
    /// The cp battery: eight GNU-vs-ours comparisons, the parallel threshold
    /// sweep and the single-file startup measurement.
    #[must_use]
    pub fn copy_bench() -> Self {
        let comparisons = vec![
            BenchmarkDefinition::new("bench_many_small_files", "many_small", "GNU cp -R", "our cp -R"),
            BenchmarkDefinition::new("bench_preserve_metadata", "recursive", "GNU cp -a", "our cp -a"),
            BenchmarkDefinition::new("bench_deep_tree", "deep_tree", "GNU cp -R", "our cp -R"),
            BenchmarkDefinition::new("bench_mixed_sizes", "mixed", "GNU cp -R", "our cp -R"),
            BenchmarkDefinition::new(
                "bench_large_file_100mb",
                "large_file",
                "GNU cp",
                "our cp (copy_file_range)",
            ),
            BenchmarkDefinition::new("bench_hardlink_heavy", "hardlink", "GNU cp -a", "our cp -a"),
            BenchmarkDefinition::new("bench_symlink_heavy", "symlink", "GNU cp -R", "our cp -R"),
            BenchmarkDefinition::new("bench_sparse_file", "sparse", "GNU cp", "our cp (sparse=auto)"),
        ];

        Self {
            comparisons,
            grouped: GroupedBenchmark {
                id: "bench_parallel_threshold".to_string(),
                load_sizes: vec![32, 64, 128, 256],
                label_template: "our cp -R ({n} files)".to_string(),
            },
            scalar: ScalarBenchmark {
                id: "bench_single_file_startup".to_string(),
                name: "startup_ms".to_string(),
            },
        }
    }

    /// Number of external process runs one full pass performs.
    #[must_use]
    pub fn total_runs(&self) -> usize {
        self.comparisons.len() + 2
    }

    /// Look up a comparison definition by result key.
    #[must_use]
    pub fn definition(&self, key: &str) -> Option<&BenchmarkDefinition> {
        self.comparisons.iter().find(|def| def.key == key)
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::copy_bench()
    }
}

/// Qualitative classification of a speedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Fast,
    Par,
    Slow,
}

impl Verdict {
    /// Classify `baseline / candidate`.
    #[must_use]
    pub fn from_speedup(speedup: f64) -> Self {
        if speedup >= FAST_THRESHOLD {
            Self::Fast
        } else if speedup >= PAR_THRESHOLD {
            Self::Par
        } else {
            Self::Slow
        }
    }

    /// CSS class token used in the report.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Par => "par",
            Self::Slow => "slow",
        }
    }

    /// Human label shown under the speedup.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fast => "faster",
            Self::Par => "on par",
            Self::Slow => "scan overhead",
        }
    }

    /// Single-glyph marker for terminal tables.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Fast => "▲",
            Self::Par => "─",
            Self::Slow => "▼",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Baseline/candidate timing pair for one result key.
///
/// Both values are strictly positive; partial pairs are never constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub baseline_ms: f64,
    pub candidate_ms: f64,
}

impl ComparisonResult {
    /// Build a pair, rounding both sides to one decimal.
    ///
    /// Returns `None` unless both rounded values are finite and positive.
    #[must_use]
    pub fn new(baseline_ms: f64, candidate_ms: f64) -> Option<Self> {
        let baseline_ms = round_tenth(baseline_ms);
        let candidate_ms = round_tenth(candidate_ms);
        (is_valid_duration(baseline_ms) && is_valid_duration(candidate_ms)).then_some(Self {
            baseline_ms,
            candidate_ms,
        })
    }

    /// Both sides finite and positive. Always true for pairs built with
    /// [`ComparisonResult::new`]; deserialized or hand-built pairs may not be.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_duration(self.baseline_ms) && is_valid_duration(self.candidate_ms)
    }

    /// `baseline / candidate`: above 1 means the candidate is faster.
    #[must_use]
    pub fn speedup(&self) -> f64 {
        self.baseline_ms / self.candidate_ms
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        Verdict::from_speedup(self.speedup())
    }
}

/// Durations keyed by load size. Sizes never observed are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdSeries(BTreeMap<u32, f64>);

impl ThresholdSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, size: u32, ms: f64) {
        self.0.insert(size, ms);
    }

    #[must_use]
    pub fn get(&self, size: u32) -> Option<f64> {
        self.0.get(&size).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries in ascending load-size order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(size, ms)| (*size, *ms))
    }

    /// Largest duration in the series.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.0.values().copied().reduce(f64::max)
    }

    /// Bar height for one entry, normalized against the series maximum and
    /// clamped to `[10, 100]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn magnitude(&self, ms: f64) -> u32 {
        let Some(max) = self.max().filter(|max| *max > 0.0) else {
            return 10;
        };
        (ms / max * 90.0).round().clamp(10.0, 100.0) as u32
    }
}

impl FromIterator<(u32, f64)> for ThresholdSeries {
    fn from_iter<T: IntoIterator<Item = (u32, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything a run measured.
///
/// This is the sole input to the report patcher; it carries no knowledge of
/// how it was produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub comparisons: BTreeMap<String, ComparisonResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdSeries>,
    /// Process startup overhead of a single-file copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_ms: Option<f64>,
}

impl ResultSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty() && self.threshold.is_none() && self.startup_ms.is_none()
    }

    #[must_use]
    pub fn comparison(&self, key: &str) -> Option<&ComparisonResult> {
        self.comparisons.get(key)
    }
}
