//! Version command implementation.

use crate::error::Result;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'a str>,
}

fn version_line(version: &str, build: &str, commit: Option<&str>) -> String {
    let mut line = format!("copybench {version} ({build})");
    if let Some(commit) = commit {
        let short = commit.get(..7).unwrap_or(commit);
        let _ = write!(line, " ({short})");
    }
    line
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let commit = option_env!("COPYBENCH_GIT_SHA").filter(|s| !s.trim().is_empty());

    if json {
        let output = VersionOutput {
            version,
            build,
            commit,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", version_line(version, build, commit));
    Ok(())
}
