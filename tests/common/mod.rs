#![allow(dead_code)]

use std::sync::Once;

pub mod cli;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        copybench::logging::init_test_logging();
    });
}

/// The report fixture every end-to-end test starts from.
pub const REPORT_FIXTURE: &str = include_str!("../fixtures/report.html");

/// Fake benchmark program: prints canned diagnostics on stderr per id.
///
/// Covers a full comparison, a comparison with its candidate label missing,
/// a slower candidate, a failing benchmark, the threshold series and the
/// startup scalar. Setting `FAKE_BENCH_SLOW=<id>` makes that id hang.
pub const FAKE_BENCH: &str = r#"#!/bin/sh
if [ -n "$FAKE_BENCH_SLOW" ] && [ "$1" = "$FAKE_BENCH_SLOW" ]; then
  exec sleep 5
fi
case "$1" in
  bench_many_small_files)
    echo "running 1 test" >&2
    echo "  GNU cp -R: 120.43ms avg (5 runs)" >&2
    echo "  our cp -R: 40.06ms avg (5 runs)" >&2
    ;;
  bench_deep_tree)
    echo "  GNU cp -R: 50.0ms avg (5 runs)" >&2
    ;;
  bench_hardlink_heavy)
    echo "thread 'bench_hardlink_heavy' panicked" >&2
    exit 101
    ;;
  bench_sparse_file)
    echo "  GNU cp: 40.0ms avg (5 runs)" >&2
    echo "  our cp (sparse=auto): 44.0ms avg (5 runs)" >&2
    ;;
  bench_parallel_threshold)
    echo "  our cp -R (32 files): 5.0ms avg (5 runs)" >&2
    echo "  our cp -R (64 files): 9.8ms avg (5 runs)" >&2
    echo "  our cp -R (128 files): 20.1ms avg (5 runs)" >&2
    echo "  our cp -R (256 files): 41.0ms avg (5 runs)" >&2
    ;;
  bench_single_file_startup)
    echo "startup overhead: ~1.24ms" >&2
    ;;
esac
exit 0
"#;

/// Project config pointing the runner at the fake benchmark script.
pub const FAKE_CONFIG: &str = "program: sh\nargs:\n  - fake-bench.sh\n  - \"{bench}\"\ntimeout: 30\n";
