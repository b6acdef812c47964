//! Threshold chart and startup scalar patching.
//!
//! Each threshold column ends with a label naming its load size; the fill
//! bar and time text sit a few lines above it, so the scan runs backward.

use super::values::format_ms;
use crate::model::ThresholdSeries;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"height: \d+%").expect("height regex"));
static TIME_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[\d.]+ (?:ms|s)<").expect("time text regex"));
static STARTUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~[\d.]+ (?:ms|s)").expect("startup regex"));

const FILL_MARKERS: [&str; 2] = ["threshold-fill", "height:"];
const TIME_MARKER: &str = "t-time";
/// Marker of the line holding the startup overhead value.
pub const STARTUP_MARKER: &str = "startup-val\">";

/// Literal label anchor for one load size.
#[must_use]
pub fn label_anchor(size: u32) -> String {
    format!("threshold-label\">{size}<")
}

/// Which part of a threshold column a rewrite touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnField {
    Fill,
    Time,
}

/// One rewritten threshold line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHit {
    pub size: u32,
    pub field: ColumnField,
    pub line: usize,
    pub before: String,
    pub after: String,
}

/// Something the threshold pass looked for and did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMiss {
    Label(u32),
    Field(u32, ColumnField),
}

/// Outcome of the threshold pass.
#[derive(Debug, Clone, Default)]
pub struct ThresholdPatch {
    pub hits: Vec<ColumnHit>,
    pub missed: Vec<ColumnMiss>,
}

/// Update every observed load size's column.
///
/// For each size, the first line containing its label anchor is located;
/// the `window` lines above it are scanned nearest-first for the fill and
/// time fields, each updated at most once.
pub fn patch_threshold(
    lines: &mut [String],
    series: &ThresholdSeries,
    window: usize,
) -> ThresholdPatch {
    let mut patch = ThresholdPatch::default();

    for (size, ms) in series.iter() {
        let anchor = label_anchor(size);
        let Some(label_idx) = lines.iter().position(|line| line.contains(&anchor)) else {
            patch.missed.push(ColumnMiss::Label(size));
            continue;
        };

        let height = format!("height: {}%", series.magnitude(ms));
        let time = format!(">{}<", format_ms(ms));
        let mut fill_done = false;
        let mut time_done = false;

        for idx in (label_idx.saturating_sub(window)..label_idx).rev() {
            if !fill_done && FILL_MARKERS.iter().all(|m| lines[idx].contains(m)) {
                let after = HEIGHT_RE
                    .replace_all(&lines[idx], NoExpand(&height))
                    .into_owned();
                let before = std::mem::replace(&mut lines[idx], after.clone());
                patch.hits.push(ColumnHit {
                    size,
                    field: ColumnField::Fill,
                    line: idx,
                    before,
                    after,
                });
                fill_done = true;
            }
            if !time_done && lines[idx].contains(TIME_MARKER) {
                let after = TIME_TEXT_RE
                    .replace_all(&lines[idx], NoExpand(&time))
                    .into_owned();
                let before = std::mem::replace(&mut lines[idx], after.clone());
                patch.hits.push(ColumnHit {
                    size,
                    field: ColumnField::Time,
                    line: idx,
                    before,
                    after,
                });
                time_done = true;
            }
            if fill_done && time_done {
                break;
            }
        }

        if !fill_done {
            patch.missed.push(ColumnMiss::Field(size, ColumnField::Fill));
        }
        if !time_done {
            patch.missed.push(ColumnMiss::Field(size, ColumnField::Time));
        }
    }

    patch
}

/// Update the startup overhead value on the first line carrying its marker.
///
/// Returns `(line, before, after)` when the marker exists.
pub fn patch_startup(lines: &mut [String], startup_ms: f64) -> Option<(usize, String, String)> {
    let idx = lines.iter().position(|line| line.contains(STARTUP_MARKER))?;
    let text = format!("~{}", format_ms(startup_ms));
    let after = STARTUP_RE
        .replace_all(&lines[idx], NoExpand(&text))
        .into_owned();
    let before = std::mem::replace(&mut lines[idx], after.clone());
    Some((idx, before, after))
}
