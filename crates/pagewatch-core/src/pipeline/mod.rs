//! Step pipelines
//!
//! A pipeline is a linked chain of steps built once from a
//! [`ComponentSpec`](crate::config::ComponentSpec) and reused across all
//! batch iterations:
//!
//! ```text
//! ┌──────────┐      ┌──────────┐      ┌──────────┐
//! │   Open   │─────▶│  Watch   │─────▶│  Return  │
//! │  (fetch) │store │ (change  │store │ (assemble│──▶ payload data
//! │          │      │  check)  │      │  output) │
//! └──────────┘      └──────────┘      └──────────┘
//! ```
//!
//! Each run threads one mutable [`Store`] through the chain. Open and
//! watch steps fetch, parse, and write extracted fields into it; the
//! terminal return step assembles the emitted record from it. A watch
//! step that sees no change stops the run early with an empty result.
//!
//! The chain is immutable after construction. The only state that
//! survives across runs is each watch step's memory of last-observed
//! values, owned exclusively by that step instance.

pub mod builder;
pub mod open;
pub mod ret;
pub mod watch;

pub use builder::build_pipeline;
pub use open::OpenStep;
pub use ret::ReturnStep;
pub use watch::WatchStep;

use serde_json::Value;
use tracing::Instrument;

use crate::store::Store;

/// One pre-linked pipeline node. The set of variants is closed; dispatch
/// is by match, not virtual calls.
pub enum Step {
    /// Fetch a resource and store extracted fields
    Open(OpenStep),
    /// Fetch a resource, continue only on change
    Watch(WatchStep),
    /// Terminal: assemble the payload data
    Return(ReturnStep),
}

impl Step {
    /// Run the chain starting at this step, threading `store` through it.
    ///
    /// Returns the return step's record, or `None` when a watch step saw
    /// no change. Each step's result is handed back verbatim; nothing is
    /// accumulated along the way.
    pub async fn run(&mut self, mut store: Store) -> crate::Result<Option<Value>> {
        let mut current = self;
        loop {
            current = match current {
                Step::Open(step) => {
                    let span = tracing::debug_span!("open step");
                    step.execute(&mut store).instrument(span).await?;
                    step.next_mut()
                }
                Step::Watch(step) => {
                    let span = tracing::debug_span!("watch step");
                    if !step.execute(&mut store).instrument(span).await? {
                        return Ok(None);
                    }
                    step.next_mut()
                }
                Step::Return(step) => {
                    let span = tracing::debug_span!("return step");
                    let _guard = span.enter();
                    return Ok(Some(step.execute(&mut store)?));
                }
            };
        }
    }

    /// Record a change baseline for every watch step in the chain.
    /// Idempotent; must run before the first live run so watch steps have
    /// something to compare against.
    pub async fn prime(&mut self) -> crate::Result<()> {
        let mut current = self;
        loop {
            current = match current {
                Step::Open(step) => step.next_mut(),
                Step::Watch(step) => {
                    step.prime().await?;
                    step.next_mut()
                }
                Step::Return(_) => return Ok(()),
            };
        }
    }

    /// Number of linked steps, this one included
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut current = self;
        loop {
            count += 1;
            current = match current {
                Step::Open(step) => step.next(),
                Step::Watch(step) => step.next(),
                Step::Return(_) => return count,
            };
        }
    }

    /// The chain's terminal step
    pub fn terminal(&self) -> &Step {
        let mut current = self;
        loop {
            current = match current {
                Step::Open(step) => step.next(),
                Step::Watch(step) => step.next(),
                Step::Return(_) => return current,
            };
        }
    }
}

/// A built pipeline: the head of its step chain plus the seed store every
/// run starts from
pub struct Pipeline {
    head: Step,
    seed: Store,
    entity_name: String,
}

impl Pipeline {
    pub(crate) fn new(head: Step, seed: Store, entity_name: String) -> Self {
        Self {
            head,
            seed,
            entity_name,
        }
    }

    /// Head of the step chain
    pub fn head(&self) -> &Step {
        &self.head
    }

    /// Name of the entity this pipeline scrapes for
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Number of steps in the chain
    pub fn len(&self) -> usize {
        self.head.len()
    }

    /// Prime watch-step baselines (see [`Step::prime`])
    pub async fn prime(&mut self) -> crate::Result<()> {
        self.head.prime().await
    }

    /// Run the pipeline once against a fresh clone of its seed store
    pub async fn run_once(&mut self) -> crate::Result<Option<Value>> {
        let store = self.seed.clone();
        self.head.run(store).await
    }
}
