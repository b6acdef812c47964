//! Benchmark execution.
//!
//! Each benchmark runs as its own external process, one at a time, with a
//! wall-clock timeout. Only the diagnostic stream (stderr) and the exit
//! status are consumed. A failure is scoped to that one benchmark.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Placeholder in argument templates replaced by the benchmark id.
pub const BENCH_PLACEHOLDER: &str = "{bench}";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Why a benchmark produced no output.
#[derive(Error, Debug)]
pub enum ExecutionFailure {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("exited with {status}")]
    ExitStatus { status: ExitStatus },

    #[error("timed out after {}s", .timeout.as_secs())]
    TimedOut { timeout: Duration },

    #[error("I/O error while waiting: {0}")]
    Io(#[from] io::Error),
}

/// Something that can run one benchmark and hand back its diagnostic text.
pub trait BenchRunner {
    /// Run benchmark `id` to completion.
    ///
    /// # Errors
    ///
    /// Returns an `ExecutionFailure` on non-zero exit, timeout, or spawn
    /// failure. Callers treat that as "no data" for this benchmark only.
    fn run(&mut self, id: &str) -> Result<String, ExecutionFailure>;
}

/// Runs benchmarks as child processes of a configured program.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    /// `args` may contain [`BENCH_PLACEHOLDER`]; if none does, the id is
    /// appended as the last argument.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        workdir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: workdir.into(),
            timeout,
        }
    }

    /// The argument vector for one benchmark id.
    #[must_use]
    pub fn command_args(&self, id: &str) -> Vec<String> {
        if self.args.iter().any(|arg| arg.contains(BENCH_PLACEHOLDER)) {
            self.args
                .iter()
                .map(|arg| arg.replace(BENCH_PLACEHOLDER, id))
                .collect()
        } else {
            let mut args = self.args.clone();
            args.push(id.to_string());
            args
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl BenchRunner for ProcessRunner {
    fn run(&mut self, id: &str) -> Result<String, ExecutionFailure> {
        let args = self.command_args(id);
        debug!(program = %self.program, ?args, workdir = %self.workdir.display(), "Spawning benchmark");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        isolate_process_group(&mut command);
        let mut child = command
            .spawn()
            .map_err(|source| ExecutionFailure::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain stderr on a helper thread so a chatty benchmark cannot fill
        // the pipe and stall while we poll for exit.
        let stderr = child.stderr.take();
        let reader = thread::spawn(move || {
            let mut text = String::new();
            if let Some(mut stream) = stderr {
                let mut bytes = Vec::new();
                if stream.read_to_end(&mut bytes).is_ok() {
                    text = String::from_utf8_lossy(&bytes).into_owned();
                }
            }
            text
        });

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!(bench = id, timeout_secs = self.timeout.as_secs(), "Benchmark timed out");
                // The benchmark proper is usually a grandchild (cargo runs the
                // test binary), so the whole group goes. Anything that left
                // the group may still hold the pipe, so the reader is detached.
                terminate(&mut child);
                drop(reader);
                return Err(ExecutionFailure::TimedOut {
                    timeout: self.timeout,
                });
            }
            Err(err) => {
                terminate(&mut child);
                drop(reader);
                return Err(err.into());
            }
        };

        // Background processes the benchmark left behind must not overlap
        // the next measurement.
        kill_process_group(&child);
        let text = reader.join().unwrap_or_default();
        if !status.success() {
            debug!(bench = id, %status, stderr_tail = tail(&text, 400), "Benchmark failed");
            return Err(ExecutionFailure::ExitStatus { status });
        }

        Ok(text)
    }
}

/// Put the child in a fresh process group led by itself.
#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_command: &mut Command) {}

/// Signal every process in the child's group. Errors are ignored: the
/// group may already be empty.
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let group = format!("-{}", child.id());
    match Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if !status.success() => trace!(pgid = child.id(), "Process group already empty"),
        Ok(_) => trace!(pgid = child.id(), "Killed process group"),
        Err(err) => warn!(pgid = child.id(), error = %err, "Could not signal process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

fn terminate(child: &mut Child) {
    kill_process_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

/// Poll until the child exits or `timeout` elapses (`Ok(None)`).
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(args: &[&str]) -> ProcessRunner {
        ProcessRunner::new(
            "cargo",
            args.iter().map(ToString::to_string).collect(),
            ".",
            Duration::from_secs(600),
        )
    }

    #[test]
    fn placeholder_is_substituted() {
        let r = runner(&["test", "--release", "--test", "copy_bench", "{bench}", "--", "--nocapture"]);
        assert_eq!(
            r.command_args("bench_deep_tree"),
            vec!["test", "--release", "--test", "copy_bench", "bench_deep_tree", "--", "--nocapture"]
        );
    }

    #[test]
    fn id_is_appended_without_placeholder() {
        let r = runner(&["run"]);
        assert_eq!(r.command_args("bench_x"), vec!["run", "bench_x"]);
    }

    #[test]
    fn tail_respects_char_boundaries() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("aµb", 2), "b");
    }

    #[cfg(unix)]
    #[test]
    fn captures_stderr_on_success() {
        let mut r = ProcessRunner::new(
            "sh",
            vec!["-c".to_string(), "echo \"  our cp: 1.0ms avg (1 runs) $0\" >&2".to_string(), BENCH_PLACEHOLDER.to_string()],
            ".",
            Duration::from_secs(10),
        );
        let text = r.run("bench_a").expect("run");
        assert!(text.contains("our cp: 1.0ms avg"));
        assert!(text.contains("bench_a"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_failure() {
        let mut r = ProcessRunner::new(
            "sh",
            vec!["-c".to_string(), "exit 3".to_string()],
            ".",
            Duration::from_secs(10),
        );
        assert!(matches!(r.run("bench_a"), Err(ExecutionFailure::ExitStatus { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn slow_benchmark_times_out() {
        let mut r = ProcessRunner::new(
            "sh",
            vec!["-c".to_string(), "exec sleep 5".to_string()],
            ".",
            Duration::from_millis(200),
        );
        let start = Instant::now();
        assert!(matches!(r.run("bench_a"), Err(ExecutionFailure::TimedOut { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    fn marker_script(script: &str, dir: &std::path::Path, timeout: Duration) -> ProcessRunner {
        ProcessRunner::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            dir,
            timeout,
        )
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_background_grandchildren() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let mut r = marker_script(
            "(sleep 1; touch marker) & wait",
            temp.path(),
            Duration::from_millis(200),
        );

        assert!(matches!(r.run("bench_a"), Err(ExecutionFailure::TimedOut { .. })));
        thread::sleep(Duration::from_millis(1500));
        assert!(!temp.path().join("marker").exists(), "grandchild outlived the timeout");
    }

    #[cfg(unix)]
    #[test]
    fn finished_benchmark_leaves_nothing_running() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let mut r = marker_script(
            "(sleep 1; touch marker) & echo '  our cp: 1.0ms avg (1 runs)' >&2",
            temp.path(),
            Duration::from_secs(10),
        );

        let text = r.run("bench_a").expect("run");
        assert!(text.contains("our cp: 1.0ms avg"));
        thread::sleep(Duration::from_millis(1500));
        assert!(!temp.path().join("marker").exists(), "background job outlived the run");
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let mut r = ProcessRunner::new(
            "copybench-definitely-not-a-program",
            Vec::new(),
            ".",
            Duration::from_secs(1),
        );
        assert!(matches!(r.run("bench_a"), Err(ExecutionFailure::Spawn { .. })));
    }
}
