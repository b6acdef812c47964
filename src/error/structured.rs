//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::CopybenchError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Report
    ReportNotFound,
    ReportUnreadable,
    ReportWriteFailed,

    // Snapshot
    SnapshotNotFound,
    SnapshotInvalid,

    // Config
    ConfigError,
    ConfigParseError,

    // I/O
    IoError,
    JsonError,

    // Internal
    InternalError,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReportNotFound => "REPORT_NOT_FOUND",
            Self::ReportUnreadable => "REPORT_UNREADABLE",
            Self::ReportWriteFailed => "REPORT_WRITE_FAILED",
            Self::SnapshotNotFound => "SNAPSHOT_NOT_FOUND",
            Self::SnapshotInvalid => "SNAPSHOT_INVALID",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ConfigParseError => "CONFIG_PARSE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 6: Report and snapshot errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ReportNotFound
            | Self::ReportUnreadable
            | Self::ReportWriteFailed
            | Self::SnapshotNotFound
            | Self::SnapshotInvalid => 6,
            Self::ConfigError | Self::ConfigParseError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `CopybenchError`.
    #[must_use]
    pub fn from_error(err: &CopybenchError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = match err {
            CopybenchError::UnknownConfigKey { similar, .. } if !similar.is_empty() => {
                Some(format!("Did you mean '{}'?", similar[0]))
            }
            _ => err.suggestion().map(str::to_string),
        };

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: err.is_user_recoverable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &CopybenchError) -> (ErrorCode, Option<Value>) {
        let path_context = |path: &std::path::Path| Some(json!({"path": path.display().to_string()}));
        match err {
            CopybenchError::ReportNotFound { path } => (ErrorCode::ReportNotFound, path_context(path)),
            CopybenchError::ReportUnreadable { path, .. } => {
                (ErrorCode::ReportUnreadable, path_context(path))
            }
            CopybenchError::ReportWrite { path, .. } => {
                (ErrorCode::ReportWriteFailed, path_context(path))
            }
            CopybenchError::SnapshotNotFound { path } => {
                (ErrorCode::SnapshotNotFound, path_context(path))
            }
            CopybenchError::SnapshotInvalid { path, reason } => (
                ErrorCode::SnapshotInvalid,
                Some(json!({"path": path.display().to_string(), "reason": reason})),
            ),
            CopybenchError::Config(_) => (ErrorCode::ConfigError, None),
            CopybenchError::UnknownConfigKey { key, similar } => (
                ErrorCode::ConfigError,
                Some(json!({"key": key, "similar": similar})),
            ),
            CopybenchError::Yaml(_) => (ErrorCode::ConfigParseError, None),
            CopybenchError::Io(_) => (ErrorCode::IoError, None),
            CopybenchError::Json(_) => (ErrorCode::JsonError, None),
            CopybenchError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}

/// Levenshtein edit distance between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Candidates within a third of the input's length in edit distance,
/// closest first.
#[must_use]
pub fn find_similar(input: &str, candidates: &[&str], max_suggestions: usize) -> Vec<String> {
    let limit = (input.chars().count() / 3).max(1);
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|candidate| (levenshtein_distance(input, candidate), *candidate))
        .filter(|(distance, _)| *distance <= limit)
        .collect();
    scored.sort_by_key(|(distance, candidate)| (*distance, *candidate));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ReportNotFound.as_str(), "REPORT_NOT_FOUND");
        assert_eq!(ErrorCode::SnapshotInvalid.as_str(), "SNAPSHOT_INVALID");
        assert_eq!(ErrorCode::InternalError.as_str(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_code_exit_codes() {
        assert_eq!(ErrorCode::ReportUnreadable.exit_code(), 6);
        assert_eq!(ErrorCode::SnapshotNotFound.exit_code(), 6);
        assert_eq!(ErrorCode::ConfigParseError.exit_code(), 7);
        assert_eq!(ErrorCode::IoError.exit_code(), 8);
        assert_eq!(ErrorCode::InternalError.exit_code(), 1);
    }

    #[test]
    fn test_from_error_carries_path_and_hint() {
        let err = CopybenchError::ReportNotFound {
            path: PathBuf::from("html/index.html"),
        };
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.code, ErrorCode::ReportNotFound);
        assert!(structured.retryable);
        assert!(structured.hint.is_some());
        assert_eq!(
            structured.context.as_ref().expect("context")["path"],
            "html/index.html"
        );
    }

    #[test]
    fn test_retryable_follows_user_recoverable() {
        let invalid = CopybenchError::SnapshotInvalid {
            path: PathBuf::from("bench-results.json"),
            reason: "expected value".to_string(),
        };
        assert!(StructuredError::from_error(&invalid).retryable);

        let io = CopybenchError::Io(std::io::Error::other("disk on fire"));
        let structured = StructuredError::from_error(&io);
        assert!(!structured.retryable);
        assert_eq!(structured.to_json()["error"]["retryable"], false);
    }

    #[test]
    fn test_structured_error_to_json() {
        let err = StructuredError::from_error(&CopybenchError::config("bad timeout"));
        let json = err.to_json();
        assert_eq!(json["error"]["code"], "CONFIG_ERROR");
        assert_eq!(json["error"]["message"], "Configuration error: bad timeout");
        assert!(json["error"]["retryable"].as_bool().expect("bool"));
    }

    #[test]
    fn test_unknown_config_key_suggests() {
        let err = CopybenchError::UnknownConfigKey {
            key: "timout".to_string(),
            similar: find_similar("timout", &["root", "report", "timeout"], 2),
        };
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.hint.as_deref(), Some("Did you mean 'timeout'?"));
        assert_eq!(structured.code.exit_code(), 7);

        assert!(find_similar("zzz", &["root", "report"], 2).is_empty());
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("program", "program"), 0);
    }

    #[test]
    fn test_to_human_output() {
        let err = StructuredError {
            code: ErrorCode::SnapshotNotFound,
            message: "Results snapshot not found at 'x.json'".to_string(),
            hint: Some("Run it first".to_string()),
            retryable: true,
            context: None,
        };

        let plain = err.to_human(false);
        assert!(plain.contains("Error: Results snapshot not found"));
        assert!(plain.contains("Hint: Run it first"));

        let colored = err.to_human(true);
        assert!(colored.contains("\x1b[31m"));
        assert!(colored.contains("\x1b[33m"));
    }
}
