//! Error type for record sinks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while appending records.
#[derive(Debug, Error)]
pub enum SinkError {
    /// File system error creating or flushing the output file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization or write error.
    #[error("CSV error writing to {path}: {source}")]
    Csv {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl SinkError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_io_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = SinkError::io("/tmp/tweets.csv", io);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/tweets.csv"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }
}
