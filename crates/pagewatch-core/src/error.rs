//! Error types for the scraping pipeline
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the scraping pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed component or step specification. Fatal at build time,
    /// never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// A fetch that could not be issued or completed (unresolved target,
    /// transport failure, timeout).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A fetch that completed with a non-200 status. Carries the raw
    /// response body for diagnostics.
    #[error("fetch failed with status {status}: {body}")]
    FetchStatus {
        /// HTTP status code of the response
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response content-type is not one of the recognized kinds
    /// (JSON, HTML, RSS).
    #[error("unsupported content type: {0}")]
    ContentType(String),

    /// Payload sink errors. Not caught by the engine; these propagate to
    /// the engine's caller.
    #[error("sink error: {0}")]
    Sink(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a fetch error from a non-200 response
    pub fn fetch_status(status: u16, body: impl Into<String>) -> Self {
        Self::FetchStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an unsupported content-type error
    pub fn content_type(msg: impl Into<String>) -> Self {
        Self::ContentType(msg.into())
    }

    /// Create a sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// True for errors raised while fetching or parsing a resource
    /// (as opposed to build-time configuration errors).
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::FetchStatus { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
