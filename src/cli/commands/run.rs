//! Run command implementation.

use super::patch_and_report;
use crate::aggregate::{ResultSnapshot, collect_results, write_snapshot};
use crate::cli::RunArgs;
use crate::config::{CliOverrides, Settings};
use crate::error::Result;
use crate::format::render_summary;
use crate::model::Suite;
use crate::report::read_document;
use crate::runner::ProcessRunner;
use crate::util::SuiteProgress;
use tracing::{debug, info};

/// Execute the run command.
///
/// The report is read before any benchmark starts so a missing or
/// unreadable document fails without spending time on measurements.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the report cannot be read
/// or written, or the snapshot cannot be written.
pub fn execute(args: &RunArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = Settings::load(overrides)?;
    debug!(?settings, "Resolved settings");

    let document = read_document(&settings.report)?;
    let suite = Suite::copy_bench();

    let mut runner = ProcessRunner::new(
        settings.program.clone(),
        settings.args.clone(),
        settings.root.clone(),
        settings.timeout,
    );
    info!(
        benchmarks = suite.total_runs(),
        program = %settings.program,
        timeout_secs = settings.timeout.as_secs(),
        "Running benchmark suite"
    );

    let mut progress = SuiteProgress::new(suite.total_runs());
    let results = collect_results(&mut runner, &suite, &mut progress);
    progress.finish();

    write_snapshot(&ResultSnapshot::new(results.clone()), &settings.results)?;

    if !json {
        println!("Results written to {}", settings.results.display());
        println!("\n{}", render_summary(&suite, &results));
    }

    patch_and_report(
        &settings,
        &document,
        &results,
        Some(&settings.results),
        args.dry_run,
        json,
    )
}
