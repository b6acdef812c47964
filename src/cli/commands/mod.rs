//! Command implementations.

pub mod apply;
pub mod completions;
pub mod list;
pub mod run;
pub mod version;

use crate::config::Settings;
use crate::error::Result;
use crate::format::{PatchSummary, render_changes, render_misses};
use crate::model::{ResultSet, Suite};
use crate::report::{ReportDocument, ReportLayout, ReportPatcher, write_document};
use std::path::Path;
use tracing::info;

/// Patch `document` with `results`, write it back unless `dry_run`, and
/// report what happened.
///
/// # Errors
///
/// Returns an error if the patched report cannot be written or the JSON
/// summary cannot be serialized.
pub(crate) fn patch_and_report(
    settings: &Settings,
    document: &ReportDocument,
    results: &ResultSet,
    results_path: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let suite = Suite::copy_bench();
    let layout = ReportLayout::copy_bench();
    let outcome = ReportPatcher::new(&layout).patch(document, results);

    let written = !dry_run;
    if written {
        write_document(&settings.report, &outcome.document)?;
        info!(
            path = %settings.report.display(),
            changed = outcome.changes.len(),
            "Report updated"
        );
    }

    if json {
        let mut summary = PatchSummary::new(&suite, results, &outcome, &settings.report, written);
        if let Some(path) = results_path {
            summary = summary.with_results_path(path);
        }
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if dry_run {
        println!("\n{}", render_changes(&outcome.changes));
        if let Some(misses) = render_misses(&outcome.misses) {
            println!("{misses}");
        }
        println!("\n(dry run: {} not modified)", settings.report.display());
    } else {
        println!(
            "\n{} updated ({} line(s) changed).",
            settings.report.display(),
            outcome.changes.len()
        );
    }

    Ok(())
}
