//! Error types for prismops-logs

use thiserror::Error;

/// Errors raised while validating tool input or storing fetched files
#[derive(Error, Debug)]
pub enum LogsError {
    /// `lines` was not an integer
    #[error("lines must be an integer")]
    LinesNotInteger,

    /// `lines` was outside the allowed range
    #[error("lines must be between {min} and {max}")]
    LinesOutOfRange {
        /// Smallest accepted value
        min: u32,
        /// Largest accepted value
        max: u32,
    },

    /// A required parameter was missing or blank
    #[error("{0} is required")]
    Missing(&'static str),

    /// Requested path would leave the log root
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Writing a fetched file failed
    #[error("error writing file {path}: {source}")]
    Write {
        /// Local path being written
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl From<LogsError> for prismops_exec::ExecError {
    fn from(err: LogsError) -> Self {
        prismops_exec::ExecError::Output(err.to_string())
    }
}
