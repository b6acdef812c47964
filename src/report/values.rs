//! Display values derived from measurements.

use crate::model::{ComparisonResult, PAR_THRESHOLD, Verdict};

/// Narrowest bar the report draws, so a tiny bar stays visible.
pub const MIN_BAR_WIDTH: u32 = 2;
pub const MAX_BAR_WIDTH: u32 = 100;

/// Render a duration the way the report shows it.
///
/// `>= 1000` ms as seconds with one decimal, `>= 100` ms as whole
/// milliseconds, anything smaller with one decimal.
#[must_use]
pub fn format_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.1} s", ms / 1000.0)
    } else if ms >= 100.0 {
        format!("{ms:.0} ms")
    } else {
        format!("{ms:.1} ms")
    }
}

/// Percentage width of `part` relative to `whole`, clamped to `[2, 100]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn relative_width(part: f64, whole: f64) -> u32 {
    (part / whole * 100.0)
        .round()
        .clamp(f64::from(MIN_BAR_WIDTH), f64::from(MAX_BAR_WIDTH)) as u32
}

/// Everything one comparison card displays, computed once per entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CardValues {
    pub baseline_width: u32,
    pub candidate_width: u32,
    /// Candidate bar carries the extra `slower` class.
    pub candidate_slower: bool,
    pub baseline_time: String,
    pub candidate_time: String,
    pub speedup: f64,
    pub verdict: Verdict,
}

impl CardValues {
    #[must_use]
    pub fn from_comparison(result: &ComparisonResult) -> Self {
        let speedup = result.speedup();
        let (baseline_width, candidate_width, candidate_slower) = if speedup >= PAR_THRESHOLD {
            (
                MAX_BAR_WIDTH,
                relative_width(result.candidate_ms, result.baseline_ms),
                false,
            )
        } else {
            (
                relative_width(result.baseline_ms, result.candidate_ms),
                MAX_BAR_WIDTH,
                true,
            )
        };

        Self {
            baseline_width,
            candidate_width,
            candidate_slower,
            baseline_time: format_ms(result.baseline_ms),
            candidate_time: format_ms(result.candidate_ms),
            speedup,
            verdict: Verdict::from_speedup(speedup),
        }
    }

    /// Speedup as rendered in the card, e.g. `3.0x`.
    #[must_use]
    pub fn speedup_text(&self) -> String {
        format!("{:.1}x", self.speedup)
    }
}
