//! Open step
//!
//! Fetches its configured target, parses the response body, and writes
//! extracted fields into the store for the rest of the chain. The fetch
//! and parse mechanics live here as free functions because the watch step
//! shares them unchanged.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::body::Body;
use crate::config::StepSpec;
use crate::error::Error;
use crate::fetch::Fetcher;
use crate::pipeline::Step;
use crate::store::Store;

/// Step that fetches a resource and stores extracted fields
pub struct OpenStep {
    spec: StepSpec,
    next: Box<Step>,
    fetcher: Arc<dyn Fetcher>,
}

impl OpenStep {
    pub(crate) fn new(spec: StepSpec, next: Box<Step>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            spec,
            next,
            fetcher,
        }
    }

    pub(crate) fn next(&self) -> &Step {
        &self.next
    }

    pub(crate) fn next_mut(&mut self) -> &mut Step {
        &mut self.next
    }

    /// Fetch, parse, and populate the store. The store is untouched when
    /// the fetch or parse fails.
    pub(crate) async fn execute(&self, store: &mut Store) -> crate::Result<()> {
        debug!(settings = ?self.spec, "running open step");

        let body = fetch_body(&self.spec, store, self.fetcher.as_ref()).await?;
        apply_store_mapping(&self.spec, &body, store);
        store.record_prev(&self.spec)
    }
}

/// Resolve the step's request URL against the store, fetch it, enforce
/// the 200-only success rule, and parse the body.
pub(crate) async fn fetch_body(
    spec: &StepSpec,
    store: &Store,
    fetcher: &dyn Fetcher,
) -> crate::Result<Body> {
    let url = request_url(spec, store)?;
    let response = fetcher.fetch(&url).await?;

    if response.status != 200 {
        return Err(Error::fetch_status(response.status, response.body));
    }

    Body::from_response(&response)
}

/// Resolve the configured target and join it against the previous step's
/// target. A relative locator resolves against the previous absolute one;
/// when no base resolves, the locator is used literally. A target that
/// resolves to nothing is a fetch error.
pub(crate) fn request_url(spec: &StepSpec, store: &Store) -> crate::Result<String> {
    let target = spec
        .target
        .as_ref()
        .and_then(|t| t.resolve(store))
        .ok_or_else(|| Error::fetch("scraping target resolved to none"))?;

    // Whitespace inside configured locators is noise, not content
    let target: String = target.split_whitespace().collect();

    let joined = store
        .prev_target()
        .and_then(|prev| prev.resolve(store))
        .and_then(|base| Url::parse(&base).ok())
        .and_then(|base| base.join(&target).ok())
        .map(|url| url.to_string());

    Ok(joined.unwrap_or(target))
}

/// Write every declared `dest → src` extraction into the store. Paths the
/// body cannot answer store as null.
pub(crate) fn apply_store_mapping(spec: &StepSpec, body: &Body, store: &mut Store) {
    for (dest, src) in &spec.store {
        store.set(dest, body.extract(src).unwrap_or(Value::Null));
    }
}
