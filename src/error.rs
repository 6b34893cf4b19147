//! Custom error types and handling
//!
//! Every stage of the ranking pipeline reports failures through [`AppError`].
//! Only [`AppError::MetricNotFound`] is recovered from (it becomes part of a
//! trial's error text); everything else aborts the run.

use std::path::{Path, PathBuf};

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Filesystem errors
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parsing errors
    #[error("{0}")]
    MetricNotFound(String),

    // External service errors
    #[error("External tool error: {0}")]
    ExternalTool(String),

    // Startup errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Report errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Wrap an I/O error together with the path that caused it
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::MetricNotFound(_) => "METRIC_NOT_FOUND",
            Self::ExternalTool(_) => "EXTERNAL_TOOL_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Csv(_) => "CSV_ERROR",
        }
    }

    /// Whether the pipeline can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MetricNotFound(_))
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
