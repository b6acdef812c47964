//! Progress indicator for the benchmark suite.
//!
//! Drawn on stderr only when it is an interactive terminal; hidden
//! otherwise so piped output stays clean.

use crate::aggregate::RunObserver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};
use std::time::Duration;
use tracing::info;

/// Check if we should show progress indicators.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Create a determinate progress bar.
///
/// Falls back to the default bar style if the template is rejected.
#[must_use]
pub fn create_progress_bar(total: u64, show: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if show {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("=>-"));
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(120));
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// One bar over the whole suite, advanced per finished benchmark.
pub struct SuiteProgress {
    bar: ProgressBar,
    failed: usize,
}

impl SuiteProgress {
    /// Bar over `total` benchmark runs, shown if stderr is a terminal.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self::with_visibility(total, should_show_progress())
    }

    #[must_use]
    pub fn with_visibility(total: usize, show: bool) -> Self {
        Self {
            bar: create_progress_bar(u64::try_from(total).unwrap_or(u64::MAX), show),
            failed: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Finish and clear the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RunObserver for SuiteProgress {
    fn started(&mut self, id: &str) {
        info!(bench = id, "Running benchmark");
        self.bar.set_message(id.to_string());
    }

    fn finished(&mut self, id: &str, ok: bool) {
        if ok {
            info!(bench = id, "Benchmark finished");
        } else {
            self.failed += 1;
            self.bar.println(format!("  {id}: failed"));
        }
        self.bar.inc(1);
    }
}
