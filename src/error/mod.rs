//! Error types and handling for `copybench`.
//!
//! - `thiserror` for the library error type
//! - `anyhow` accepted at the edges via [`CopybenchError::Other`]
//! - Recovery hints for user-facing errors
//! - Structured JSON output for scripted callers (see [`StructuredError`])

mod structured;

pub use structured::{ErrorCode, StructuredError, find_similar};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `copybench` operations.
#[derive(Error, Debug)]
pub enum CopybenchError {
    // === Report Errors ===
    /// Report document does not exist.
    #[error("Report not found at '{path}'")]
    ReportNotFound { path: PathBuf },

    /// Report exists but could not be read as UTF-8 text.
    #[error("Cannot read report '{path}': {source}")]
    ReportUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Patched report could not be written back.
    #[error("Cannot write report '{path}': {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Snapshot Errors ===
    /// Results snapshot does not exist.
    #[error("Results snapshot not found at '{path}'")]
    SnapshotNotFound { path: PathBuf },

    /// Results snapshot is not valid JSON of the expected shape.
    #[error("Invalid results snapshot '{path}': {reason}")]
    SnapshotInvalid { path: PathBuf, reason: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration names a key this tool does not know.
    #[error("Unknown configuration key: {key}")]
    UnknownConfigKey {
        key: String,
        similar: Vec<String>,
    },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CopybenchError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ReportNotFound { .. }
                | Self::SnapshotNotFound { .. }
                | Self::SnapshotInvalid { .. }
                | Self::Config(_)
                | Self::UnknownConfigKey { .. }
                | Self::Yaml(_)
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ReportNotFound { .. } => Some("Pass --report or set report in .copybench.yaml"),
            Self::ReportUnreadable { .. } => Some("Check the report is readable UTF-8 text"),
            Self::ReportWrite { .. } => Some("Check write permissions on the report directory"),
            Self::SnapshotNotFound { .. } => {
                Some("Run: copybench run --dry-run to produce a snapshot first")
            }
            Self::SnapshotInvalid { .. } => Some("Regenerate it with: copybench run --dry-run"),
            Self::Config(_) | Self::UnknownConfigKey { .. } | Self::Yaml(_) => {
                Some("Check .copybench.yaml and COPYBENCH_* variables")
            }
            _ => None,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type using `CopybenchError`.
pub type Result<T> = std::result::Result<T, CopybenchError>;
