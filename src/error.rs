//! Error types for the feature-extraction engine
//!
//! Two tiers of failure exist: setup-fatal errors (missing file, parse
//! failure, un-normalizable score container) abort a whole extraction and
//! produce a `failed` record; feature-local errors are caught at the
//! analyzer boundary and downgraded to warnings on an otherwise `extracted`
//! record.

use thiserror::Error;

/// Errors that can occur during feature extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Input path does not exist (pre-flight check, distinct from a parse
    /// failure).
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The source file could not be parsed into a score.
    #[error("parse error: {0}")]
    ParseError(String),

    /// The score container violates a structural assumption (bad pitch
    /// spelling, empty stream where content is required).
    #[error("invalid score: {0}")]
    InvalidScore(String),

    /// A feature computation failed internally.
    #[error("analysis error: {0}")]
    AnalysisError(String),

    /// Writing batch output failed.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExtractError {
    fn from(error: std::io::Error) -> Self {
        ExtractError::Io(error.to_string())
    }
}

/// Truncate an error message so records stay size-stable.
pub(crate) fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        message.to_string()
    } else {
        message.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = ExtractError::FileNotFound("/no/such/file.mxl".to_string());
        assert_eq!(e.to_string(), "file not found: /no/such/file.mxl");
        let e = ExtractError::InvalidScore("empty part".to_string());
        assert_eq!(e.to_string(), "invalid score: empty part");
    }

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("short", 1000), "short");
        let long = "x".repeat(2000);
        assert_eq!(truncate_message(&long, 1000).len(), 1000);
    }
}
