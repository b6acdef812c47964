//! Apply command implementation: re-patch the report from a saved snapshot.

use super::patch_and_report;
use crate::aggregate::read_snapshot;
use crate::cli::ApplyArgs;
use crate::config::{CliOverrides, Settings};
use crate::error::Result;
use crate::format::render_summary;
use crate::model::Suite;
use crate::report::read_document;
use tracing::info;

/// Execute the apply command.
///
/// # Errors
///
/// Returns an error if the snapshot is missing or invalid, or the report
/// cannot be read or written.
pub fn execute(args: &ApplyArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = Settings::load(overrides)?;
    let snapshot_path = args.from.clone().unwrap_or_else(|| settings.results.clone());

    let document = read_document(&settings.report)?;
    let snapshot = read_snapshot(&snapshot_path)?;
    info!(
        path = %snapshot_path.display(),
        generated_at = %snapshot.generated_at,
        "Applying results snapshot"
    );
    let results = snapshot.into_results();

    if !json {
        println!("{}", render_summary(&Suite::copy_bench(), &results));
    }

    patch_and_report(
        &settings,
        &document,
        &results,
        Some(&snapshot_path),
        args.dry_run,
        json,
    )
}
