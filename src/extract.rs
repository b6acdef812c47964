//! Measurement extraction from raw benchmark output.
//!
//! The copy benchmarks print lines like:
//!
//! ```text
//!   GNU cp -R: 120.4ms avg (5 runs)
//!   our cp -R: 40.1ms avg (5 runs)
//!   startup overhead: ~1.2ms
//! ```
//!
//! Averages come from `Duration`'s debug format, so the unit may also be
//! `s`, `µs` or `ns`; everything is normalized to milliseconds.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

static MEASUREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(.+?):\s+(\S+?)(ns|µs|us|ms|s) avg(?: \((\d+) runs?\))?")
        .expect("measurement regex")
});
static STARTUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"startup overhead: ~([0-9][0-9.]*)ms").expect("startup regex")
});

/// Label → duration (ms) parsed from one benchmark's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSample {
    times: HashMap<String, f64>,
}

impl MeasurementSample {
    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.times.get(label).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.times.keys().map(String::as_str)
    }
}

/// Collect every `<label>: <n><unit> avg` line.
///
/// Later occurrences of a label overwrite earlier ones. Malformed numbers
/// leave the label out rather than failing.
#[must_use]
pub fn parse_times(output: &str) -> MeasurementSample {
    let mut times = HashMap::new();

    for caps in MEASUREMENT_RE.captures_iter(output) {
        let label = caps[1].trim();
        let Some(ms) = parse_duration_ms(&caps[2], &caps[3]) else {
            trace!(label, raw = &caps[2], "Skipping malformed measurement");
            continue;
        };
        times.insert(label.to_string(), ms);
    }

    MeasurementSample { times }
}

/// Find the `startup overhead: ~<n>ms` scalar, if printed.
///
/// The last occurrence that parses wins, matching how timing labels repeat.
#[must_use]
pub fn parse_startup(output: &str) -> Option<f64> {
    STARTUP_RE
        .captures_iter(output)
        .filter_map(|caps| parse_non_negative(&caps[1]))
        .last()
}

fn parse_duration_ms(number: &str, unit: &str) -> Option<f64> {
    let value = parse_non_negative(number)?;
    let scale = match unit {
        "ns" => 1e-6,
        "µs" | "us" => 1e-3,
        "ms" => 1.0,
        "s" => 1e3,
        _ => return None,
    };
    Some(value * scale)
}

fn parse_non_negative(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}
