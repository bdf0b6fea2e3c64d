// src/error.rs

//! Error types for repository index building

use std::num::ParseIntError;
use thiserror::Error;

/// Malformed metadata block or index text
#[derive(Error, Debug)]
pub enum FormatError {
    /// A non-blank line without the `": "` field separator
    #[error("invalid line {line}: did not contain a \": \" separator: {content:?}")]
    MissingSeparator { line: usize, content: String },

    /// A `Size` field that is not a base-10 integer
    #[error("invalid line {line}: error parsing size {value:?}: {source}")]
    InvalidSize {
        line: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl FormatError {
    /// 1-based line number of the offending line
    pub fn line(&self) -> usize {
        match self {
            Self::MissingSeparator { line, .. } | Self::InvalidSize { line, .. } => *line,
        }
    }
}

/// Errors produced while building or publishing a repository
#[derive(Error, Debug)]
pub enum Error {
    #[error("Format error: {0}")]
    FormatError(#[from] FormatError),

    /// Object is absent from storage. Recovered by the builder as an empty index.
    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Storage error for '{key}': {reason}")]
    StorageError { key: String, reason: String },

    #[error("Failed to extract metadata from {path}: {reason}")]
    ExtractionError { path: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported architecture '{architecture}' in {path} (supported: {supported})")]
    UnsupportedArchitecture {
        architecture: String,
        path: String,
        supported: String,
    },
}

impl Error {
    /// Whether this is a storage "not found" response
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundError(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_separator_message() {
        let err = FormatError::MissingSeparator {
            line: 1,
            content: "BadLineNoColon".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 1"));
        assert!(msg.contains("\"BadLineNoColon\""));
    }

    #[test]
    fn test_invalid_size_keeps_source() {
        let source = "12x".parse::<i64>().unwrap_err();
        let err = Error::from(FormatError::InvalidSize {
            line: 7,
            value: "12x".to_string(),
            source,
        });
        assert!(err.to_string().contains("\"12x\""));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFoundError("k".to_string()).is_not_found());
        assert!(
            !Error::StorageError {
                key: "k".to_string(),
                reason: "denied".to_string()
            }
            .is_not_found()
        );
    }
}
