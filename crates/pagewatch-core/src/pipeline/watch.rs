//! Watch step
//!
//! Same fetch/parse mechanics as the open step, gated by a change check:
//! the chain only continues when at least one watched element differs
//! from the value remembered from the previous invocation. The remembered
//! values are this step instance's own state and live as long as the
//! pipeline; they are the system's only state outside the per-run store.
//!
//! Baselines are recorded by an explicit [`WatchStep::prime`] call before
//! the first live run (an out-of-band fetch against an empty store), so
//! construction itself does no I/O.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::StepSpec;
use crate::fetch::Fetcher;
use crate::pipeline::Step;
use crate::pipeline::open::{apply_store_mapping, fetch_body};
use crate::store::Store;

/// Step that fetches a resource and continues only when a watched element
/// changed
pub struct WatchStep {
    spec: StepSpec,
    next: Box<Step>,
    fetcher: Arc<dyn Fetcher>,

    /// Always report "changed" (configuration flag for dry runs)
    mock: bool,

    /// Last observed value per watched element path
    observed: HashMap<String, Option<Value>>,
    primed: bool,
}

impl WatchStep {
    pub(crate) fn new(
        spec: StepSpec,
        next: Box<Step>,
        fetcher: Arc<dyn Fetcher>,
        mock: bool,
    ) -> Self {
        Self {
            spec,
            next,
            fetcher,
            mock,
            observed: HashMap::new(),
            primed: false,
        }
    }

    pub(crate) fn next(&self) -> &Step {
        &self.next
    }

    pub(crate) fn next_mut(&mut self) -> &mut Step {
        &mut self.next
    }

    fn elements(&self) -> &[String] {
        self.spec
            .target
            .as_ref()
            .map(|t| t.elements.as_slice())
            .unwrap_or(&[])
    }

    /// Fetch once against an empty store and remember the current value of
    /// every watched element, so the first live run has a baseline.
    /// Idempotent.
    pub(crate) async fn prime(&mut self) -> crate::Result<()> {
        if self.primed {
            return Ok(());
        }

        let empty = Store::new();
        let body = fetch_body(&self.spec, &empty, self.fetcher.as_ref()).await?;

        let elements: Vec<String> = self.elements().to_vec();
        for element in elements {
            let value = body.extract(&element);
            self.observed.insert(element, value);
        }

        self.primed = true;
        Ok(())
    }

    /// Fetch and run the change check. Returns `true` when the chain
    /// should continue (store populated, observations refreshed), `false`
    /// when nothing changed (store untouched).
    pub(crate) async fn execute(&mut self, store: &mut Store) -> crate::Result<bool> {
        debug!(settings = ?self.spec, "running watch step");

        let body = fetch_body(&self.spec, store, self.fetcher.as_ref()).await?;

        let changed = self.mock
            || self
                .elements()
                .iter()
                .any(|element| self.observed.get(element) != Some(&body.extract(element)));

        if !changed {
            return Ok(false);
        }

        apply_store_mapping(&self.spec, &body, store);

        let elements: Vec<String> = self.elements().to_vec();
        for element in elements {
            let value = body.extract(&element);
            self.observed.insert(element, value);
        }

        store.record_prev(&self.spec)?;
        Ok(true)
    }
}
