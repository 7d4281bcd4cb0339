//! Batch engine
//!
//! The ScrapeEngine is responsible for:
//! - Building one pipeline per configured component
//! - Priming watch-step baselines before the first batch
//! - Running batches: every pipeline once, in order, against a fresh
//!   clone of its seed store
//! - Handing non-empty results to the payload sink
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   run_once()   ┌────────────────────────┐
//! │ ScrapeEngine │───────────────▶│ Pipeline (step chain)  │
//! └──────────────┘                └────────────────────────┘
//!         │                                  │
//!         │ Payload                          │ GET
//!         ▼                                  ▼
//! ┌──────────────┐                ┌────────────────────────┐
//! │ PayloadSink  │                │ Fetcher (HTTP)         │
//! └──────────────┘                └────────────────────────┘
//! ```
//!
//! ## Batch Flow
//!
//! 1. Clone the pipeline's seed store (mutations never leak across
//!    iterations)
//! 2. Run the step chain
//! 3. Non-empty result → deliver to the sink, tagged with the source
//!    identifier
//! 4. Sleep the configured wait after each pipeline, then continue with
//!    the next one
//!
//! Pipelines run strictly sequentially; the inter-pipeline sleep
//! throttles aggregate request rate. A pipeline failure is governed by
//! the configured [`FailurePolicy`]: isolate (log, keep going) or abort
//! (first failure ends the batch loop). Sink errors always propagate.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, error, info};

use crate::config::{FailurePolicy, ScrapeConfig};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::pipeline::{Pipeline, build_pipeline};
use crate::sink::{PAYLOAD_SOURCE, Payload, PayloadSink};

/// Batch runner over all configured pipelines
///
/// ## Lifecycle
///
/// 1. Create with [`ScrapeEngine::new()`] — builds every pipeline, no I/O
/// 2. Start with [`ScrapeEngine::run()`] — primes watch baselines, then
///    loops until shutdown
///
/// Embedders that want their own scheduling can call
/// [`ScrapeEngine::prime()`] and [`ScrapeEngine::run_batch()`] directly.
pub struct ScrapeEngine {
    /// Built pipelines, in component declaration order
    pipelines: Vec<Pipeline>,

    /// Downstream consumer of emitted payloads
    sink: Box<dyn PayloadSink>,

    /// Sleep after each pipeline's run within a batch
    wait_time: Duration,

    /// What a pipeline failure does to the rest of the batch loop
    failure_policy: FailurePolicy,

    /// Whether watch baselines have been recorded
    primed: bool,
}

impl ScrapeEngine {
    /// Build an engine from a validated configuration
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] when the configuration or any component's
    /// step list is malformed.
    pub fn new(
        config: &ScrapeConfig,
        fetcher: Arc<dyn Fetcher>,
        sink: Box<dyn PayloadSink>,
    ) -> Result<Self> {
        config.validate()?;

        let names: Vec<&str> = config
            .components
            .iter()
            .map(|c| c.entity.name.as_str())
            .collect();
        info!(components = ?names, "building pipelines");

        let pipelines = config
            .components
            .iter()
            .map(|component| build_pipeline(component, Arc::clone(&fetcher), &config.options))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pipelines,
            sink,
            wait_time: Duration::from_secs(config.options.wait_time_secs),
            failure_policy: config.options.failure_policy,
            primed: false,
        })
    }

    /// The built pipelines (read-only)
    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    /// Record change baselines for every watch step. Runs each watch
    /// step's out-of-band fetch; idempotent.
    pub async fn prime(&mut self) -> Result<()> {
        for pipeline in &mut self.pipelines {
            pipeline.prime().await?;
        }
        self.primed = true;
        Ok(())
    }

    /// Run the engine until a shutdown signal is received
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Test-only variant of [`ScrapeEngine::run`] with a controlled
    /// shutdown channel instead of OS signals.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        if !self.primed {
            self.prime().await?;
        }

        info!(pipelines = self.pipelines.len(), "engine started");

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for the provided shutdown signal
            loop {
                tokio::select! {
                    result = self.run_batch() => result?,
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT
            loop {
                tokio::select! {
                    result = self.run_batch() => result?,
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        }

        info!("engine stopped");
        Ok(())
    }

    /// Run one batch: every pipeline once, in order, with the configured
    /// sleep after each.
    pub async fn run_batch(&mut self) -> Result<()> {
        let span = tracing::info_span!("batch run");
        let wait_time = self.wait_time;
        let failure_policy = self.failure_policy;
        let pipelines = &mut self.pipelines;
        let sink = self.sink.as_ref();

        async move {
            for (index, pipeline) in pipelines.iter_mut().enumerate() {
                let pipeline_span = tracing::info_span!(
                    "pipeline run",
                    index,
                    entity = %pipeline.entity_name(),
                );

                match pipeline.run_once().instrument(pipeline_span).await {
                    Ok(Some(data)) => {
                        sink.deliver(Payload::new(PAYLOAD_SOURCE, data)).await?;
                    }
                    Ok(None) => {
                        debug!(entity = %pipeline.entity_name(), "no change, nothing to emit");
                    }
                    Err(e) => {
                        error!(
                            index,
                            entity = %pipeline.entity_name(),
                            error = %e,
                            "pipeline run failed",
                        );
                        if failure_policy == FailurePolicy::Abort {
                            return Err(e);
                        }
                    }
                }

                tokio::time::sleep(wait_time).await;
            }
            Ok(())
        }
        .instrument(span)
        .await
    }
}
