//! List command implementation.

use crate::error::Result;
use crate::model::Suite;
use crate::report::ReportLayout;
use serde::Serialize;

#[derive(Serialize)]
struct ListOutput<'a> {
    suite: &'a Suite,
    anchors: Vec<AnchorRow<'a>>,
}

#[derive(Serialize)]
struct AnchorRow<'a> {
    key: &'a str,
    marker: &'a str,
}

/// Render the suite as plain text.
fn render_suite(suite: &Suite, layout: &ReportLayout) -> String {
    let mut lines = vec![format!("{} comparisons:", suite.comparisons.len())];
    for def in &suite.comparisons {
        let marker = layout.card(&def.key).map_or("-", |card| card.marker.as_str());
        lines.push(format!("  {:<12} {}", def.key, def.id));
        lines.push(format!(
            "  {:<12} '{}' vs '{}'  {}",
            "", def.baseline_label, def.candidate_label, marker
        ));
    }

    let sizes: Vec<String> = suite
        .grouped
        .load_sizes
        .iter()
        .map(ToString::to_string)
        .collect();
    lines.push(format!(
        "grouped: {} (sizes {}; label '{}')",
        suite.grouped.id,
        sizes.join(", "),
        suite.grouped.label_template
    ));
    lines.push(format!("scalar:  {} ({})", suite.scalar.id, suite.scalar.name));
    lines.join("\n")
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let suite = Suite::copy_bench();
    let layout = ReportLayout::copy_bench();

    if json {
        let output = ListOutput {
            suite: &suite,
            anchors: layout
                .cards
                .iter()
                .map(|card| AnchorRow {
                    key: &card.key,
                    marker: &card.marker,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", render_suite(&suite, &layout));
    Ok(())
}
