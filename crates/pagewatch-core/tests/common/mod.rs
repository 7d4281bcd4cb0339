//! Test doubles and common utilities for pipeline contract tests
//!
//! These doubles verify pipeline behavior without touching the network:
//! `MockFetcher` serves scripted responses per URL and counts calls,
//! `CollectingSink` records every delivered payload.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use pagewatch_core::config::{
    Action, ComponentSpec, EntitySpec, ScrapeOptions, StepSpec, TargetKind, TargetSpec,
};
use pagewatch_core::error::{Error, Result};
use pagewatch_core::fetch::{FetchedResponse, Fetcher};
use pagewatch_core::sink::{Payload, PayloadSink};

/// A fetcher serving scripted responses per URL
///
/// Responses can be swapped mid-test to simulate a source changing
/// between batch iterations. URLs without a scripted response fail with
/// a fetch error.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, FetchedResponse>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for a URL (replacing any previous script)
    pub fn respond(&self, url: &str, status: u16, content_type: &str, body: &str) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            FetchedResponse {
                status,
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
    }

    /// Script a 200 JSON response for a URL
    pub fn respond_json(&self, url: &str, body: &str) {
        self.respond(url, 200, "application/json", body);
    }

    /// All fetched URLs, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times a URL was fetched
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("no scripted response for {}", url)))
    }
}

/// A sink recording every delivered payload
pub struct CollectingSink {
    payloads: Arc<Mutex<Vec<Payload>>>,
}

impl CollectingSink {
    /// Create a sink plus a handle the test keeps for assertions
    pub fn new() -> (Self, Arc<Mutex<Vec<Payload>>>) {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                payloads: Arc::clone(&payloads),
            },
            payloads,
        )
    }
}

#[async_trait]
impl PayloadSink for CollectingSink {
    async fn deliver(&self, payload: Payload) -> Result<()> {
        self.payloads.lock().unwrap().push(payload);
        Ok(())
    }
}

/// Options with no inter-pipeline sleep, for fast tests
pub fn fast_options() -> ScrapeOptions {
    ScrapeOptions {
        wait_time_secs: 0,
        ..ScrapeOptions::default()
    }
}

pub fn url_target(value: &str) -> TargetSpec {
    TargetSpec {
        kind: TargetKind::Url,
        value: value.to_string(),
        elements: Vec::new(),
    }
}

pub fn store_target(value: &str) -> TargetSpec {
    TargetSpec {
        kind: TargetKind::Store,
        value: value.to_string(),
        elements: Vec::new(),
    }
}

pub fn watch_target(value: &str, elements: &[&str]) -> TargetSpec {
    TargetSpec {
        kind: TargetKind::Url,
        value: value.to_string(),
        elements: elements.iter().map(|e| e.to_string()).collect(),
    }
}

fn mapping(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(dest, src)| (dest.to_string(), src.to_string()))
        .collect()
}

pub fn open_step(target: TargetSpec, store: &[(&str, &str)]) -> StepSpec {
    StepSpec {
        action: Action::Open,
        target: Some(target),
        store: mapping(store),
    }
}

pub fn watch_step(target: TargetSpec, store: &[(&str, &str)]) -> StepSpec {
    StepSpec {
        action: Action::Watch,
        target: Some(target),
        store: mapping(store),
    }
}

pub fn return_step(store: &[(&str, &str)]) -> StepSpec {
    StepSpec {
        action: Action::Return,
        target: None,
        store: mapping(store),
    }
}

pub fn component(ticker: &str, name: &str, steps: Vec<StepSpec>) -> ComponentSpec {
    ComponentSpec {
        entity: EntitySpec {
            ticker: ticker.to_string(),
            name: name.to_string(),
        },
        steps,
    }
}
