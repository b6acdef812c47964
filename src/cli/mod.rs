//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Run the cp benchmark battery and patch the benchmark report in place
#[derive(Parser, Debug)]
#[command(name = "copybench", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root the benchmarks run in (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Report document to patch, relative to the root
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Results snapshot path, relative to the root
    #[arg(long, global = true)]
    pub results: Option<PathBuf>,

    /// Program that runs one benchmark
    #[arg(long, global = true)]
    pub program: Option<String>,

    /// Per-benchmark timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Config file (default: <root>/.copybench.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write logs as JSON lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the benchmark suite and patch the report
    Run(RunArgs),

    /// Patch the report from a saved results snapshot
    Apply(ApplyArgs),

    /// List the configured benchmark suite
    List,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Measure and summarize, but leave the report untouched
    #[arg(long, visible_alias = "preview")]
    pub dry_run: bool,
}

/// Arguments for the apply command.
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Snapshot to apply (default: the configured results path)
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Show the changes without writing the report
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
