//! Payload delivery
//!
//! The engine hands every non-empty pipeline result to a [`PayloadSink`].
//! Sinks are the system's downstream boundary; errors they raise are not
//! caught by the engine and propagate to its caller.

pub mod log;

pub use log::LogSink;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Source tag attached to every payload the engine emits
pub const PAYLOAD_SOURCE: &str = "scraper";

/// The final structured output of one successful pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    /// Originating source identifier
    pub source: String,

    /// The emitted record: `{entity: {...}, <extracted fields>}`
    pub data: Value,
}

impl Payload {
    /// Create a payload with the given source tag
    pub fn new(source: impl Into<String>, data: Value) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }
}

/// Trait for payload consumers
#[async_trait]
pub trait PayloadSink: Send + Sync {
    /// Deliver one payload. Invoked synchronously by the engine, exactly
    /// once per non-empty pipeline result.
    async fn deliver(&self, payload: Payload) -> crate::Result<()>;
}
