//! Boxed terminal summary of a run.

use crate::model::{ResultSet, Suite};
use crate::report::format_ms;

const INNER_WIDTH: usize = 61;

fn row(cells: [&str; 4]) -> String {
    let content = format!(
        "  {:<20}  {:>8}    {:>8}    {}",
        cells[0], cells[1], cells[2], cells[3]
    );
    let pad = INNER_WIDTH.saturating_sub(content.chars().count());
    format!("│{content}{}│", " ".repeat(pad))
}

fn rule(left: char, right: char) -> String {
    format!("{left}{}{right}", "─".repeat(INNER_WIDTH))
}

/// Render the summary table.
///
/// Comparisons appear in suite order, followed by the threshold series and
/// the startup overhead when present.
#[must_use]
pub fn render_summary(suite: &Suite, results: &ResultSet) -> String {
    let mut lines = vec![
        rule('┌', '┐'),
        row(["Benchmark", "GNU", "Ours", "Speedup"]),
        rule('├', '┤'),
    ];

    for def in &suite.comparisons {
        let Some(result) = results.comparison(&def.key) else {
            continue;
        };
        let speedup = format!("{} {:.1}x", result.verdict().marker(), result.speedup());
        lines.push(row([
            &def.key,
            &format_ms(result.baseline_ms),
            &format_ms(result.candidate_ms),
            &speedup,
        ]));
    }

    if let Some(series) = &results.threshold {
        for (size, ms) in series.iter() {
            let label = format!("threshold {size}");
            lines.push(row([&label, "—", &format_ms(ms), "—"]));
        }
    }

    if let Some(ms) = results.startup_ms {
        lines.push(row(["startup", "—", &format!("~{}", format_ms(ms)), "—"]));
    }

    lines.push(rule('└', '┘'));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonResult, ThresholdSeries};
    use insta::assert_snapshot;

    #[test]
    fn summary_table() {
        let mut results = ResultSet::default();
        results.comparisons.insert(
            "many_small".to_string(),
            ComparisonResult::new(120.4, 40.1).expect("pair"),
        );
        results.comparisons.insert(
            "large_file".to_string(),
            ComparisonResult::new(50.0, 52.0).expect("pair"),
        );
        results.comparisons.insert(
            "sparse".to_string(),
            ComparisonResult::new(40.0, 44.0).expect("pair"),
        );
        results.threshold = Some([(32, 5.0), (256, 41.0)].into_iter().collect::<ThresholdSeries>());
        results.startup_ms = Some(1.2);

        assert_snapshot!("summary_table", render_summary(&Suite::copy_bench(), &results));
    }

    #[test]
    fn rows_have_equal_width() {
        let mut results = ResultSet::default();
        results.comparisons.insert(
            "deep_tree".to_string(),
            ComparisonResult::new(2345.0, 12.5).expect("pair"),
        );
        let text = render_summary(&Suite::copy_bench(), &results);
        let widths: Vec<usize> = text.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == INNER_WIDTH + 2), "{widths:?}");
        assert!(text.contains("▲ 187.6x"));
    }

    #[test]
    fn empty_results_render_frame_only() {
        let text = render_summary(&Suite::copy_bench(), &ResultSet::default());
        assert_eq!(text.lines().count(), 4);
    }
}
