//! Comparison card patching.
//!
//! A card is found by its anchor comment and consists of six fields below
//! it. The scan walks forward from the anchor over a bounded window and
//! feeds each line to the first pending slot (in fixed order) whose markers
//! it contains. A slot is consumed at most once. The speedup label is the
//! last field a card emits, so matching it ends the scan.

use super::values::CardValues;
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

static WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"width: \d+%").expect("width regex"));
static TIME_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[\d.]+ (?:ms|s)<").expect("time text regex"));
static CANDIDATE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"bench-bar-fill ours\s*(?:slower\s*)?""#).expect("candidate class regex")
});
static SPEEDUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"speedup-value \w+">[\d.]+x"#).expect("speedup regex"));
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[\w ]+<").expect("label regex"));

/// One updatable field of a card, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardSlot {
    BaselineBar,
    BaselineTime,
    CandidateBar,
    CandidateTime,
    SpeedupValue,
    SpeedupLabel,
}

impl CardSlot {
    /// Fixed matching order.
    pub const ORDER: [Self; 6] = [
        Self::BaselineBar,
        Self::BaselineTime,
        Self::CandidateBar,
        Self::CandidateTime,
        Self::SpeedupValue,
        Self::SpeedupLabel,
    ];

    /// Substrings a line must all contain to fill this slot.
    #[must_use]
    pub const fn markers(self) -> &'static [&'static str] {
        match self {
            Self::BaselineBar => &["bench-bar-fill gnu", "style="],
            Self::BaselineTime | Self::CandidateTime => &["bench-bar-time"],
            Self::CandidateBar => &["bench-bar-fill ours", "style="],
            Self::SpeedupValue => &["speedup-value"],
            Self::SpeedupLabel => &["speedup-label"],
        }
    }

    /// Slot that must already be filled. The two time fields share a
    /// marker and are told apart by the bar that precedes them.
    #[must_use]
    pub const fn prerequisite(self) -> Option<Self> {
        match self {
            Self::BaselineTime => Some(Self::BaselineBar),
            Self::CandidateTime => Some(Self::CandidateBar),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BaselineBar => "baseline_bar",
            Self::BaselineTime => "baseline_time",
            Self::CandidateBar => "candidate_bar",
            Self::CandidateTime => "candidate_time",
            Self::SpeedupValue => "speedup_value",
            Self::SpeedupLabel => "speedup_label",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::BaselineBar => 0,
            Self::BaselineTime => 1,
            Self::CandidateBar => 2,
            Self::CandidateTime => 3,
            Self::SpeedupValue => 4,
            Self::SpeedupLabel => 5,
        }
    }

    fn matches(self, line: &str) -> bool {
        self.markers().iter().all(|marker| line.contains(marker))
    }

    /// Rewrite `line` for this slot. Text outside the field is kept.
    #[must_use]
    pub fn rewrite(self, line: &str, values: &CardValues) -> String {
        match self {
            Self::BaselineBar => replace_width(line, values.baseline_width).into_owned(),
            Self::BaselineTime => replace_time(line, &values.baseline_time).into_owned(),
            Self::CandidateBar => {
                let class = if values.candidate_slower {
                    r#"bench-bar-fill ours slower""#
                } else {
                    r#"bench-bar-fill ours""#
                };
                let line = CANDIDATE_CLASS_RE.replace_all(line, NoExpand(class));
                replace_width(&line, values.candidate_width).into_owned()
            }
            Self::CandidateTime => replace_time(line, &values.candidate_time).into_owned(),
            Self::SpeedupValue => {
                let text = format!(
                    "speedup-value {}\">{}",
                    values.verdict.class(),
                    values.speedup_text()
                );
                SPEEDUP_RE
                    .replace_all(line, NoExpand(&text))
                    .into_owned()
            }
            Self::SpeedupLabel => {
                let text = format!(">{}<", values.verdict.label());
                LABEL_RE.replace_all(line, NoExpand(&text)).into_owned()
            }
        }
    }
}

impl fmt::Display for CardSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn replace_width(line: &str, width: u32) -> Cow<'_, str> {
    let text = format!("width: {width}%");
    WIDTH_RE.replace_all(line, NoExpand(&text))
}

fn replace_time<'a>(line: &'a str, time: &str) -> Cow<'a, str> {
    let text = format!(">{time}<");
    TIME_TEXT_RE.replace_all(line, NoExpand(&text))
}

/// Pending slot matchers for one card.
#[derive(Debug, Clone, Default)]
pub struct CardScan {
    done: [bool; 6],
}

impl CardScan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First pending slot, in fixed order, that `line` satisfies.
    #[must_use]
    pub fn next_match(&self, line: &str) -> Option<CardSlot> {
        CardSlot::ORDER.into_iter().find(|slot| {
            !self.is_done(*slot)
                && slot.prerequisite().is_none_or(|pre| self.is_done(pre))
                && slot.matches(line)
        })
    }

    pub fn complete(&mut self, slot: CardSlot) {
        self.done[slot.index()] = true;
    }

    #[must_use]
    pub fn is_done(&self, slot: CardSlot) -> bool {
        self.done[slot.index()]
    }

    /// Slots still unmatched, in order.
    #[must_use]
    pub fn pending(&self) -> Vec<CardSlot> {
        CardSlot::ORDER
            .into_iter()
            .filter(|slot| !self.is_done(*slot))
            .collect()
    }
}

/// A slot that was matched during a card scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotHit {
    pub slot: CardSlot,
    pub line: usize,
    pub before: String,
    pub after: String,
}

/// Outcome of scanning one card.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub hits: Vec<SlotHit>,
    pub missed: Vec<CardSlot>,
}

/// Patch the card whose anchor sits at `anchor`, scanning at most `window`
/// lines (the anchor line included). Lines are rewritten in place.
pub fn patch_card(
    lines: &mut [String],
    anchor: usize,
    window: usize,
    values: &CardValues,
) -> CardPatch {
    let mut scan = CardScan::new();
    let mut patch = CardPatch::default();
    let end = anchor.saturating_add(window).min(lines.len());

    for idx in anchor..end {
        let Some(slot) = scan.next_match(&lines[idx]) else {
            continue;
        };
        let after = slot.rewrite(&lines[idx], values);
        let before = std::mem::replace(&mut lines[idx], after.clone());
        scan.complete(slot);
        patch.hits.push(SlotHit {
            slot,
            line: idx,
            before,
            after,
        });
        if slot == CardSlot::SpeedupLabel {
            break;
        }
    }

    patch.missed = scan.pending();
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComparisonResult;

    const CARD: &str = r#"      <!-- 1. Many small files -->
      <div class="bench-card">
        <div class="bench-bar-row">
          <div class="bench-bar-fill gnu" style="width: 80%"></div>
          <span class="bench-bar-time">99.0 ms</span>
        </div>
        <div class="bench-bar-row">
          <div class="bench-bar-fill ours slower" style="width: 100%"></div>
          <span class="bench-bar-time">1.2 s</span>
        </div>
        <span class="speedup-value slow">0.1x</span>
        <span class="speedup-label">scan overhead</span>
      </div>"#;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    fn values(baseline: f64, candidate: f64) -> CardValues {
        CardValues::from_comparison(&ComparisonResult::new(baseline, candidate).expect("pair"))
    }

    #[test]
    fn all_six_slots_update() {
        let mut doc = lines(CARD);
        let patch = patch_card(&mut doc, 0, 40, &values(120.4, 40.1));

        assert!(patch.missed.is_empty(), "missed {:?}", patch.missed);
        assert_eq!(patch.hits.len(), 6);
        assert_eq!(doc[3], r#"          <div class="bench-bar-fill gnu" style="width: 100%"></div>"#);
        assert_eq!(doc[4], r#"          <span class="bench-bar-time">120 ms</span>"#);
        assert_eq!(doc[7], r#"          <div class="bench-bar-fill ours" style="width: 33%"></div>"#);
        assert_eq!(doc[8], r#"          <span class="bench-bar-time">40.1 ms</span>"#);
        assert_eq!(doc[10], r#"        <span class="speedup-value fast">3.0x</span>"#);
        assert_eq!(doc[11], r#"        <span class="speedup-label">faster</span>"#);
        assert_eq!(doc[12], "      </div>");
    }

    #[test]
    fn slower_candidate_gets_class() {
        let mut doc = lines(CARD);
        patch_card(&mut doc, 0, 40, &values(40.0, 44.0));
        assert_eq!(doc[3], r#"          <div class="bench-bar-fill gnu" style="width: 91%"></div>"#);
        assert_eq!(
            doc[7],
            r#"          <div class="bench-bar-fill ours slower" style="width: 100%"></div>"#
        );
        assert_eq!(doc[10], r#"        <span class="speedup-value slow">0.9x</span>"#);
        assert_eq!(doc[11], r#"        <span class="speedup-label">scan overhead</span>"#);
    }

    #[test]
    fn window_bounds_the_scan() {
        let mut doc = lines(CARD);
        let original = doc.clone();
        let patch = patch_card(&mut doc, 0, 4, &values(120.4, 40.1));

        assert_eq!(patch.hits.len(), 1);
        assert_eq!(patch.hits[0].slot, CardSlot::BaselineBar);
        assert_eq!(patch.missed.len(), 5);
        assert_eq!(doc[4..], original[4..]);
    }

    #[test]
    fn time_before_bar_is_not_claimed() {
        let text = r#"<!-- anchor -->
<span class="bench-bar-time">7.0 ms</span>
<div class="bench-bar-fill gnu" style="width: 50%"></div>
<span class="bench-bar-time">8.0 ms</span>"#;
        let mut doc = lines(text);
        patch_card(&mut doc, 0, 40, &values(20.0, 10.0));
        assert_eq!(doc[1], r#"<span class="bench-bar-time">7.0 ms</span>"#);
        assert_eq!(doc[3], r#"<span class="bench-bar-time">20.0 ms</span>"#);
    }

    #[test]
    fn scan_stops_after_label() {
        let mut text = CARD.to_string();
        text.push_str("\n<div class=\"bench-bar-fill gnu\" style=\"width: 7%\"></div>");
        let mut doc = lines(&text);
        patch_card(&mut doc, 0, 40, &values(120.4, 40.1));
        assert!(doc[13].contains("width: 7%"));
    }

    #[test]
    fn next_match_respects_order_and_prerequisites() {
        let mut scan = CardScan::new();
        assert_eq!(scan.next_match("<span class=\"bench-bar-time\">"), None);
        scan.complete(CardSlot::BaselineBar);
        assert_eq!(
            scan.next_match("<span class=\"bench-bar-time\">"),
            Some(CardSlot::BaselineTime)
        );
        scan.complete(CardSlot::BaselineTime);
        assert_eq!(scan.next_match("<span class=\"bench-bar-time\">"), None);
        scan.complete(CardSlot::CandidateBar);
        assert_eq!(
            scan.next_match("<span class=\"bench-bar-time\">"),
            Some(CardSlot::CandidateTime)
        );
        assert_eq!(scan.pending().len(), 3);
    }
}
