//! Error types for the Prism client

use thiserror::Error;

/// Errors that can occur when talking to Prism Central
#[derive(Error, Debug)]
pub enum PrismError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid endpoint URL
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by Prism
        message: String,
    },
}

/// Result type for Prism operations
pub type Result<T> = std::result::Result<T, PrismError>;
