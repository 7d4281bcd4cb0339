//! Logging payload sink
//!
//! Serializes each payload as one JSON line through `tracing`. The
//! default sink for the daemon; embedders with a real downstream plug in
//! their own [`PayloadSink`].

use async_trait::async_trait;
use tracing::info;

use crate::sink::{Payload, PayloadSink};

/// Sink that logs payloads as JSON lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    /// Create a new logging sink
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PayloadSink for LogSink {
    async fn deliver(&self, payload: Payload) -> crate::Result<()> {
        let line = serde_json::to_string(&payload)?;
        info!(source = %payload.source, payload = %line, "payload emitted");
        Ok(())
    }
}
