//! Outbound HTTP fetching
//!
//! Steps do not talk to the network directly; they go through the
//! [`Fetcher`] trait so tests can script responses and embedders can
//! supply their own transport. The production implementation is
//! [`HttpFetcher`].
//!
//! A fetcher reports transport-level results only. Status-code policy
//! (success is exactly 200) belongs to the steps.

pub mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;

/// A completed HTTP response, reduced to what the pipeline needs
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw `Content-Type` header value (empty when absent)
    pub content_type: String,
    /// Response body as text
    pub body: String,
}

/// Trait for issuing a single GET request
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Transport failures (connection, TLS, timeout) surface as
    /// [`crate::Error::Fetch`].
    async fn fetch(&self, url: &str) -> crate::Result<FetchedResponse>;
}
