// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error types for sensor recording export.
//!
//! Each variant maps to one failure scope:
//! - [`ExportError::FileOpen`] skips an input file
//! - [`ExportError::StreamOpen`] skips one stream of a file
//! - [`ExportError::Format`] skips one record of a stream
//! - [`ExportError::Source`] aborts the rest of an input file

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while exporting a recording.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Input recording is missing, unreadable or not a recognized container
    #[error("Failed to open recording '{path}': {reason}")]
    FileOpen {
        /// Input path
        path: String,
        /// Why the open failed
        reason: String,
    },

    /// Output file for a stream could not be created
    #[error("Failed to create output '{path}': {reason}")]
    StreamOpen {
        /// Output path
        path: String,
        /// Why the create failed
        reason: String,
    },

    /// Record fields do not match the frozen schema
    #[error("Format error in field '{field}': {reason}")]
    Format {
        /// Offending field name
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// The record source failed mid-read
    #[error("Unrecoverable source error in '{path}': {reason}")]
    Source {
        /// Input path
        path: String,
        /// Error reported by the container reader
        reason: String,
    },

    /// Write or flush failure on an output file
    #[error("I/O error ({context}): {reason}")]
    Io {
        /// What was being written
        context: String,
        /// Error message
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Validation error message
        reason: String,
    },
}

impl ExportError {
    /// Create a file open error.
    pub fn file_open(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        ExportError::FileOpen {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a stream open error.
    pub fn stream_open(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        ExportError::StreamOpen {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a format error for a record field.
    pub fn format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ExportError::Format {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unrecoverable source error.
    pub fn source_failure(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        ExportError::Source {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        ExportError::Io {
            context: context.into(),
            reason: err.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        ExportError::Config {
            reason: reason.into(),
        }
    }

    /// Whether this error ends processing of the whole input file.
    pub fn is_fatal_for_file(&self) -> bool {
        matches!(self, ExportError::FileOpen { .. } | ExportError::Source { .. })
    }

    /// Short name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::FileOpen { .. } => "file_open",
            ExportError::StreamOpen { .. } => "stream_open",
            ExportError::Format { .. } => "format",
            ExportError::Source { .. } => "source",
            ExportError::Io { .. } => "io",
            ExportError::Config { .. } => "config",
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ExportError::FileOpen { path, reason } | ExportError::Source { path, reason } => {
                vec![("path", path.clone()), ("reason", reason.clone())]
            }
            ExportError::StreamOpen { path, reason } => {
                vec![("path", path.clone()), ("reason", reason.clone())]
            }
            ExportError::Format { field, reason } => {
                vec![("field", field.clone()), ("reason", reason.clone())]
            }
            ExportError::Io { context, reason } => {
                vec![("context", context.clone()), ("reason", reason.clone())]
            }
            ExportError::Config { reason } => vec![("reason", reason.clone())],
        }
    }
}

/// Result type for sensorcsv operations.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_open_error() {
        let err = ExportError::file_open("/data/rec.mcap", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "Failed to open recording '/data/rec.mcap': No such file or directory"
        );
        assert!(err.is_fatal_for_file());
        assert_eq!(err.kind(), "file_open");
    }

    #[test]
    fn test_stream_open_error_is_not_fatal() {
        let err = ExportError::stream_open("/ro/rec_IMU_0.csv", "Permission denied");
        assert!(!err.is_fatal_for_file());
        assert_eq!(
            err.to_string(),
            "Failed to create output '/ro/rec_IMU_0.csv': Permission denied"
        );
    }

    #[test]
    fn test_format_error() {
        let err = ExportError::format("accel_msec2", "expected 3 components, got 2");
        assert!(matches!(err, ExportError::Format { .. }));
        assert_eq!(
            err.to_string(),
            "Format error in field 'accel_msec2': expected 3 components, got 2"
        );
    }

    #[test]
    fn test_source_error_is_fatal() {
        let err = ExportError::source_failure("rec.mcap", "truncated chunk");
        assert!(err.is_fatal_for_file());
        assert_eq!(err.kind(), "source");
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = ExportError::io("write row", io_err);
        assert_eq!(err.to_string(), "I/O error (write row): disk full");
    }

    #[test]
    fn test_log_fields_format() {
        let err = ExportError::format("rssi", "missing");
        let fields = err.log_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("field", "rssi".to_string()));
        assert_eq!(fields[1], ("reason", "missing".to_string()));
    }

    #[test]
    fn test_log_fields_config() {
        let err = ExportError::config("unknown family tag 'GPS'");
        let fields = err.log_fields();
        assert_eq!(fields, vec![("reason", "unknown family tag 'GPS'".to_string())]);
    }

    #[test]
    fn test_error_clone() {
        let err1 = ExportError::source_failure("a.mcap", "bad crc");
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
