//! `copybench`: run the cp benchmark battery and patch the static benchmark
//! report in place.
//!
//! The pipeline is strictly sequential:
//!
//! 1. [`runner`] executes one benchmark at a time as a child process.
//! 2. [`extract`] pulls labelled timings out of its diagnostic output.
//! 3. [`aggregate`] reduces the whole suite into a [`model::ResultSet`] and
//!    saves it as a JSON snapshot.
//! 4. [`report`] applies the results onto the HTML report, touching only
//!    recognized fields.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod logging;
pub mod model;
pub mod report;
pub mod runner;
pub mod util;

pub use error::{CopybenchError, ErrorCode, Result, StructuredError};
