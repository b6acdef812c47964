use super::{FAKE_BENCH, FAKE_CONFIG, REPORT_FIXTURE};
use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
pub struct BenchRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl BenchRun {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// A temp project root holding the report fixture, the fake benchmark
/// script and a `.copybench.yaml` wired to it.
pub struct BenchWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl BenchWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    /// Workspace with the fixture report and the fake benchmark installed.
    pub fn with_fixture() -> Self {
        let workspace = Self::new();
        workspace.write_report(REPORT_FIXTURE);
        fs::write(workspace.root.join("fake-bench.sh"), FAKE_BENCH).expect("write fake bench");
        fs::write(workspace.root.join(".copybench.yaml"), FAKE_CONFIG).expect("write config");
        workspace
    }

    pub fn report_path(&self) -> PathBuf {
        self.root.join("html").join("index.html")
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join("bench-results.json")
    }

    pub fn write_report(&self, text: &str) {
        let path = self.report_path();
        fs::create_dir_all(path.parent().expect("report dir")).expect("create report dir");
        fs::write(path, text).expect("write report");
    }

    pub fn report_text(&self) -> String {
        fs::read_to_string(self.report_path()).expect("read report")
    }
}

/// The binary rooted at the workspace, with every `COPYBENCH_*` setting
/// inherited from the caller's environment removed.
pub fn copybench_command(workspace: &BenchWorkspace) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("copybench"));
    cmd.current_dir(&workspace.root);
    for key in copybench::config::KNOWN_KEYS {
        cmd.env_remove(format!("{}{}", copybench::config::ENV_PREFIX, key.to_uppercase()));
    }
    cmd
}

pub fn run_copybench<I, S>(workspace: &BenchWorkspace, args: I, label: &str) -> BenchRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_copybench_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_copybench_with_env<I, S, E, K, V>(
    workspace: &BenchWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> BenchRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = copybench_command(workspace);
    cmd.args(args);
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "copybench=debug");
    cmd.env("RUST_BACKTRACE", "1");

    let start = Instant::now();
    let output = cmd.output().expect("run copybench");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    BenchRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

pub fn extract_json_payload(stdout: &str) -> String {
    let lines: Vec<&str> = stdout.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    stdout.trim().to_string()
}
