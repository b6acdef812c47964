mod common;

use common::REPORT_FIXTURE;
use common::cli::{BenchWorkspace, extract_json_payload, run_copybench};
use serde_json::Value;
use std::fs;

const SNAPSHOT: &str = r#"{
  "generated_at": "2026-01-01T00:00:00Z",
  "comparisons": {
    "large_file": { "baseline_ms": 50.0, "candidate_ms": 52.0 }
  },
  "threshold": { "32": 5.0, "256": 41.0 },
  "startup_ms": 2.5
}
"#;

fn workspace_with_snapshot() -> BenchWorkspace {
    let workspace = BenchWorkspace::new();
    workspace.write_report(REPORT_FIXTURE);
    fs::write(workspace.results_path(), SNAPSHOT).expect("write snapshot");
    workspace
}

#[test]
fn apply_projects_snapshot_onto_report() {
    let workspace = workspace_with_snapshot();

    let run = run_copybench(&workspace, ["apply"], "apply_default");
    assert!(run.status.success(), "apply failed: {}", run.stderr);

    let report = workspace.report_text();
    assert!(report.contains("<span class=\"speedup-value par\">1.0x</span>"));
    assert!(report.contains("<span class=\"speedup-label\">on par</span>"));
    assert!(report.contains(">52.0 ms<"));
    assert!(report.contains("<span class=\"startup-val\">~2.5 ms</span>"));
    assert!(report.contains("style=\"height: 11%\""));
    // 64 and 128 are absent from the snapshot.
    assert!(report.contains("<div class=\"t-time\">8.0 ms</div>"));
    assert!(report.contains("<div class=\"t-time\">16.0 ms</div>"));
    assert_eq!(report.lines().count(), REPORT_FIXTURE.lines().count());
}

#[test]
fn apply_from_explicit_snapshot_in_dry_run() {
    let workspace = workspace_with_snapshot();
    let elsewhere = workspace.root.join("old-results.json");
    fs::rename(workspace.results_path(), &elsewhere).expect("move snapshot");

    let run = run_copybench(
        &workspace,
        ["apply", "--from", "old-results.json", "--dry-run", "--json"],
        "apply_from_dry",
    );
    assert!(run.status.success(), "apply failed: {}", run.stderr);
    assert_eq!(workspace.report_text(), REPORT_FIXTURE);

    let payload: Value =
        serde_json::from_str(&extract_json_payload(&run.stdout)).expect("json summary");
    assert_eq!(payload["written"], false);
    assert_eq!(payload["comparisons"][0]["key"], "large_file");
    assert_eq!(payload["comparisons"][0]["verdict"], "par");
    let fields: Vec<String> = payload["changes"]
        .as_array()
        .expect("changes")
        .iter()
        .map(|change| change["field"]["kind"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(fields.contains(&"card".to_string()));
    assert!(fields.contains(&"startup".to_string()));
    assert!(payload["misses"].as_array().is_some_and(Vec::is_empty));
}

#[test]
fn apply_without_snapshot_fails() {
    let workspace = BenchWorkspace::new();
    workspace.write_report(REPORT_FIXTURE);

    let run = run_copybench(&workspace, ["apply"], "apply_missing");
    assert_eq!(run.exit_code(), Some(6));
    let payload: Value =
        serde_json::from_str(&extract_json_payload(&run.stderr)).expect("json error");
    assert_eq!(payload["error"]["code"], "SNAPSHOT_NOT_FOUND");
    assert_eq!(workspace.report_text(), REPORT_FIXTURE);
}

#[test]
fn apply_with_corrupt_snapshot_fails() {
    let workspace = workspace_with_snapshot();
    fs::write(workspace.results_path(), "{ not json").expect("corrupt snapshot");

    let run = run_copybench(&workspace, ["apply"], "apply_corrupt");
    assert_eq!(run.exit_code(), Some(6));
    let payload: Value =
        serde_json::from_str(&extract_json_payload(&run.stderr)).expect("json error");
    assert_eq!(payload["error"]["code"], "SNAPSHOT_INVALID");
}

#[test]
fn apply_ignores_non_positive_snapshot_values() {
    let workspace = BenchWorkspace::new();
    workspace.write_report(REPORT_FIXTURE);
    fs::write(
        workspace.results_path(),
        r#"{
  "generated_at": "2026-01-01T00:00:00Z",
  "comparisons": {
    "sparse": { "baseline_ms": 30.0, "candidate_ms": 0.0 }
  },
  "threshold": { "32": 0.0 },
  "startup_ms": -1.0
}
"#,
    )
    .expect("write snapshot");

    let run = run_copybench(&workspace, ["apply"], "apply_invalid_values");
    assert!(run.status.success(), "apply failed: {}", run.stderr);
    assert_eq!(workspace.report_text(), REPORT_FIXTURE);

    // A later valid snapshot still finds every field it needs.
    fs::write(
        workspace.results_path(),
        r#"{
  "generated_at": "2026-01-02T00:00:00Z",
  "comparisons": {
    "sparse": { "baseline_ms": 30.0, "candidate_ms": 10.0 }
  },
  "startup_ms": 1.5
}
"#,
    )
    .expect("write snapshot");

    let run = run_copybench(&workspace, ["apply"], "apply_valid_values");
    assert!(run.status.success(), "apply failed: {}", run.stderr);
    let report = workspace.report_text();
    assert!(report.contains("<span class=\"speedup-value fast\">3.0x</span>"));
    assert!(report.contains("<span class=\"startup-val\">~1.5 ms</span>"));
    assert!(!report.contains("infx"));
}
