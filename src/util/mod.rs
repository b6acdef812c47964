//! Shared utilities for `copybench`.

pub mod progress;

pub use progress::{SuiteProgress, should_show_progress};
