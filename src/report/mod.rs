//! Report document patching.
//!
//! The report is a hand-authored HTML page. Patching touches only the
//! fields this module recognizes and leaves every other byte alone:
//!
//! - Comparison cards: located by an anchor comment, six fields updated by a
//!   bounded forward scan (see [`card`]).
//! - Threshold chart: each observed load size's column, found by its label
//!   and a bounded backward scan (see [`threshold`]).
//! - Startup overhead: a single value anywhere in the page.
//!
//! Anything that cannot be found is left untouched and reported as a miss.
//! Patching the same results twice is a no-op.

pub mod card;
pub mod io;
pub mod threshold;
pub mod values;

pub use card::{CardScan, CardSlot};
pub use io::{read_document, write_document};
pub use values::{CardValues, format_ms};

use crate::model::{ResultSet, ThresholdSeries, is_valid_duration};
use serde::Serialize;
use std::fmt;
use threshold::{ColumnField, ColumnMiss};
use tracing::{debug, warn};

/// Lines scanned below a card anchor, anchor line included.
pub const CARD_WINDOW: usize = 40;
/// Lines scanned above a threshold label.
pub const THRESHOLD_WINDOW: usize = 7;

/// A report held as its sequence of lines.
///
/// Splitting and joining happen on `\n` only, so `\r` and a trailing
/// newline survive a round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    lines: Vec<String>,
}

impl ReportDocument {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Where one comparison card lives in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAnchor {
    pub marker: String,
    pub key: String,
}

impl CardAnchor {
    #[must_use]
    pub fn new(marker: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            key: key.into(),
        }
    }
}

/// Anchor vocabulary and scan windows of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// Cards in the order they are patched.
    pub cards: Vec<CardAnchor>,
    pub card_window: usize,
    pub threshold_window: usize,
}

impl ReportLayout {
    /// Layout of the cp benchmark page.
    #[must_use]
    pub fn copy_bench() -> Self {
        let cards = [
            ("<!-- 1. Many small files -->", "many_small"),
            ("<!-- 2. Recursive -a -->", "recursive"),
            ("<!-- 3. Deep tree -->", "deep_tree"),
            ("<!-- 4. Mixed sizes -->", "mixed"),
            ("<!-- 5. Large file -->", "large_file"),
            ("<!-- 6. Hardlink heavy -->", "hardlink"),
            ("<!-- 7. Symlink heavy -->", "symlink"),
            ("<!-- 8. Sparse -->", "sparse"),
        ]
        .into_iter()
        .map(|(marker, key)| CardAnchor::new(marker, key))
        .collect();

        Self {
            cards,
            card_window: CARD_WINDOW,
            threshold_window: THRESHOLD_WINDOW,
        }
    }

    #[must_use]
    pub fn card(&self, key: &str) -> Option<&CardAnchor> {
        self.cards.iter().find(|card| card.key == key)
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::copy_bench()
    }
}

/// A field the patcher targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRef {
    CardAnchor { key: String },
    Card { key: String, slot: String },
    ThresholdLabel { size: u32 },
    ThresholdFill { size: u32 },
    ThresholdTime { size: u32 },
    Startup,
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CardAnchor { key } => write!(f, "{key} (anchor)"),
            Self::Card { key, slot } => write!(f, "{key}.{slot}"),
            Self::ThresholdLabel { size } => write!(f, "threshold.{size} (label)"),
            Self::ThresholdFill { size } => write!(f, "threshold.{size}.fill"),
            Self::ThresholdTime { size } => write!(f, "threshold.{size}.time"),
            Self::Startup => f.write_str("startup"),
        }
    }
}

/// One line whose text changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    /// 1-based line number.
    pub line: usize,
    pub field: FieldRef,
    pub before: String,
    pub after: String,
}

/// A field that had a value to write but could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMiss {
    pub field: FieldRef,
}

/// Result of patching a document.
#[derive(Debug, Clone, Default)]
pub struct PatchOutcome {
    pub document: ReportDocument,
    pub changes: Vec<LineChange>,
    pub misses: Vec<FieldMiss>,
}

impl PatchOutcome {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Applies a [`ResultSet`] to a [`ReportDocument`].
#[derive(Debug, Clone)]
pub struct ReportPatcher<'a> {
    layout: &'a ReportLayout,
}

impl<'a> ReportPatcher<'a> {
    #[must_use]
    pub fn new(layout: &'a ReportLayout) -> Self {
        Self { layout }
    }

    /// Produce the patched copy of `document`.
    ///
    /// Never fails: missing anchors and fields are left as found and listed
    /// in [`PatchOutcome::misses`].
    #[must_use]
    pub fn patch(&self, document: &ReportDocument, results: &ResultSet) -> PatchOutcome {
        let mut lines = document.lines.clone();
        let mut recorder = Recorder::default();

        for anchor in &self.layout.cards {
            let Some(result) = results.comparison(&anchor.key) else {
                continue;
            };
            if !result.is_valid() {
                warn!(key = %anchor.key, "Skipping comparison with non-positive timings");
                continue;
            }
            let Some(start) = lines.iter().position(|line| line.contains(&anchor.marker)) else {
                recorder.miss(FieldRef::CardAnchor {
                    key: anchor.key.clone(),
                });
                continue;
            };

            let values = CardValues::from_comparison(result);
            let patch = card::patch_card(&mut lines, start, self.layout.card_window, &values);
            for hit in patch.hits {
                recorder.change(
                    hit.line,
                    FieldRef::Card {
                        key: anchor.key.clone(),
                        slot: hit.slot.name().to_string(),
                    },
                    hit.before,
                    hit.after,
                );
            }
            for slot in patch.missed {
                recorder.miss(FieldRef::Card {
                    key: anchor.key.clone(),
                    slot: slot.name().to_string(),
                });
            }
        }

        let series: Option<ThresholdSeries> = results.threshold.as_ref().map(|series| {
            series
                .iter()
                .filter(|(_, ms)| is_valid_duration(*ms))
                .collect()
        });
        if let Some(series) = series.filter(|s| !s.is_empty()) {
            let patch =
                threshold::patch_threshold(&mut lines, &series, self.layout.threshold_window);
            for hit in patch.hits {
                let field = match hit.field {
                    ColumnField::Fill => FieldRef::ThresholdFill { size: hit.size },
                    ColumnField::Time => FieldRef::ThresholdTime { size: hit.size },
                };
                recorder.change(hit.line, field, hit.before, hit.after);
            }
            for miss in patch.missed {
                recorder.miss(match miss {
                    ColumnMiss::Label(size) => FieldRef::ThresholdLabel { size },
                    ColumnMiss::Field(size, ColumnField::Fill) => FieldRef::ThresholdFill { size },
                    ColumnMiss::Field(size, ColumnField::Time) => FieldRef::ThresholdTime { size },
                });
            }
        }

        if let Some(startup_ms) = results.startup_ms.filter(|ms| is_valid_duration(*ms)) {
            match threshold::patch_startup(&mut lines, startup_ms) {
                Some((idx, before, after)) => {
                    recorder.change(idx, FieldRef::Startup, before, after);
                }
                None => recorder.miss(FieldRef::Startup),
            }
        }

        debug!(
            changed = recorder.changes.len(),
            missed = recorder.misses.len(),
            "Patched report"
        );

        PatchOutcome {
            document: ReportDocument { lines },
            changes: recorder.changes,
            misses: recorder.misses,
        }
    }
}

#[derive(Default)]
struct Recorder {
    changes: Vec<LineChange>,
    misses: Vec<FieldMiss>,
}

impl Recorder {
    fn change(&mut self, idx: usize, field: FieldRef, before: String, after: String) {
        if before != after {
            self.changes.push(LineChange {
                line: idx + 1,
                field,
                before,
                after,
            });
        }
    }

    fn miss(&mut self, field: FieldRef) {
        debug!(%field, "Report field not found; left unchanged");
        self.misses.push(FieldMiss { field });
    }
}
