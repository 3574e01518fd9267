//! Error types for compression-forecast.
//!
//! Every fallible operation in the workspace returns this unified error.
//! Errors carry stable numeric codes (grouped by tens) and a category for
//! machine-side grouping; messages are meant for humans.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for compression-forecast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Facade/selector argument validation failures.
    Argument,
    /// Sampling and quantization failures.
    Sampling,
    /// Base-conversion failures (vector symbol folding).
    Conversion,
    /// Out-of-range label or symbol access.
    Access,
    /// Compressor registration, dispatch and backend failures.
    Compression,
    /// Compressor-selection failures.
    Selection,
    /// Violated internal invariants.
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Argument => write!(f, "argument"),
            ErrorCategory::Sampling => write!(f, "sampling"),
            ErrorCategory::Conversion => write!(f, "conversion"),
            ErrorCategory::Access => write!(f, "access"),
            ErrorCategory::Compression => write!(f, "compression"),
            ErrorCategory::Selection => write!(f, "selection"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Unified error type for compression-forecast.
#[derive(Error, Debug)]
pub enum Error {
    // Argument errors (10-19)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("series {index} has length {actual}, expected {expected}")]
    DifferentHistoryLengths {
        index: usize,
        expected: usize,
        actual: usize,
    },

    // Sampling errors (20-29)
    #[error("series too short: {0}")]
    SeriesTooShort(String),

    #[error("intervals count overflow: {0}")]
    IntervalsCount(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    // Conversion errors (30-39)
    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("invalid base {base}: must be at least 2")]
    InvalidBase { base: usize },

    #[error("invalid digit {digit} for base {base}")]
    InvalidDigit { digit: usize, base: usize },

    // Access errors (40-49)
    #[error("out of range: {0}")]
    Range(String),

    // Compression errors (50-59)
    #[error("compressors error: {0}")]
    Compressors(String),

    // Selection errors (60-69)
    #[error("selector error: {0}")]
    Selector(String),

    // Internal errors (70-79)
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Returns the stable error code for this error kind.
    ///
    /// Codes are grouped by category:
    /// - 10-19: argument validation
    /// - 20-29: sampling
    /// - 30-39: base conversion
    /// - 40-49: access
    /// - 50-59: compression
    /// - 60-69: selection
    /// - 70-79: internal
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidArgument(_) => 10,
            Error::DifferentHistoryLengths { .. } => 11,
            Error::SeriesTooShort(_) => 20,
            Error::IntervalsCount(_) => 21,
            Error::NotImplemented(_) => 22,
            Error::EmptyInput(_) => 30,
            Error::InvalidBase { .. } => 31,
            Error::InvalidDigit { .. } => 32,
            Error::Range(_) => 40,
            Error::Compressors(_) => 50,
            Error::Selector(_) => 60,
            Error::Runtime(_) => 70,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) | Error::DifferentHistoryLengths { .. } => {
                ErrorCategory::Argument
            }

            Error::SeriesTooShort(_) | Error::IntervalsCount(_) | Error::NotImplemented(_) => {
                ErrorCategory::Sampling
            }

            Error::EmptyInput(_) | Error::InvalidBase { .. } | Error::InvalidDigit { .. } => {
                ErrorCategory::Conversion
            }

            Error::Range(_) => ErrorCategory::Access,

            Error::Compressors(_) => ErrorCategory::Compression,

            Error::Selector(_) => ErrorCategory::Selection,

            Error::Runtime(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::InvalidArgument("x".into()).code(), 10);
        assert_eq!(Error::SeriesTooShort("x".into()).code(), 20);
        assert_eq!(Error::InvalidBase { base: 1 }.code(), 31);
        assert_eq!(Error::Compressors("x".into()).code(), 50);
        assert_eq!(Error::Runtime("x".into()).code(), 70);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::InvalidArgument("x".into()).category(),
            ErrorCategory::Argument
        );
        assert_eq!(
            Error::DifferentHistoryLengths {
                index: 1,
                expected: 3,
                actual: 2
            }
            .category(),
            ErrorCategory::Argument
        );
        assert_eq!(
            Error::NotImplemented("x".into()).category(),
            ErrorCategory::Sampling
        );
        assert_eq!(
            Error::InvalidDigit { digit: 5, base: 4 }.category(),
            ErrorCategory::Conversion
        );
        assert_eq!(Error::Range("x".into()).category(), ErrorCategory::Access);
        assert_eq!(
            Error::Selector("x".into()).category(),
            ErrorCategory::Selection
        );
    }

    #[test]
    fn test_messages_mention_payload() {
        let err = Error::DifferentHistoryLengths {
            index: 2,
            expected: 19,
            actual: 18,
        };
        let text = err.to_string();
        assert!(text.contains("series 2"));
        assert!(text.contains("19"));
        assert!(text.contains("18"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Compression.to_string(), "compression");
        assert_eq!(ErrorCategory::Sampling.to_string(), "sampling");
    }
}
