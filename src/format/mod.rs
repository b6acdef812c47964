//! Output formatting for `copybench`.
//!
//! Human output is a boxed summary table plus a change listing for dry
//! runs; `--json` replaces both with a single [`PatchSummary`] document.

mod output;
mod summary;

pub use output::{ComparisonRow, PatchSummary, render_changes, render_misses};
pub use summary::render_summary;
