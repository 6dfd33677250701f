//! Error types for the POWER client

use thiserror::Error;

/// Result type alias for POWER operations
pub type Result<T> = std::result::Result<T, PowerError>;

/// Errors that can occur while fetching, parsing, or caching POWER data
#[derive(Error, Debug)]
pub enum PowerError {
    /// Network or client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("POWER API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// The response held no hourly values
    #[error("No data returned from NASA POWER")]
    NoData,

    /// An hourly key that is not `YYYYMMDDHH`
    #[error("Invalid timestamp key: {0}")]
    InvalidTimestamp(String),

    /// Request parameters rejected before sending
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache file I/O error
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
