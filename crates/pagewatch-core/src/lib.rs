// # pagewatch-core
//
// Core library for the pagewatch scraping pipeline.
//
// ## Architecture Overview
//
// This library periodically fetches remote data sources (web pages,
// JSON/HTML/RSS endpoints), extracts fields via declarative paths,
// detects state changes, and emits structured payloads downstream:
//
// - **Step pipeline**: a chain of composable steps (open a resource,
//   watch a resource for change, return an extracted payload) built once
//   per configured component
// - **Body**: content-type-polymorphic field extraction over parsed
//   responses
// - **Fetcher**: trait seam for outbound HTTP (reqwest in production,
//   scripted doubles in tests)
// - **ScrapeEngine**: batch runner that loops over all pipelines and
//   hands payloads to a `PayloadSink`
//
// ## Design Principles
//
// 1. **Declarative components**: what to fetch and extract lives in
//    configuration; the library owns only the mechanics
// 2. **Seam at the network edge**: steps never touch reqwest directly,
//    so everything above the `Fetcher` trait is testable offline
// 3. **Isolated pipelines**: no shared mutable state between pipelines;
//    each owns its chain, its seed store, and its watch baselines
// 4. **Library-first**: the daemon binary is thin glue; embedders drive
//    the engine (or single batches) directly

pub mod body;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod sink;
pub mod store;

// Re-export core types for convenience
pub use config::{ComponentSpec, EntitySpec, FailurePolicy, ScrapeConfig, ScrapeOptions, StepSpec};
pub use engine::ScrapeEngine;
pub use error::{Error, Result};
pub use fetch::{FetchedResponse, Fetcher, HttpFetcher};
pub use pipeline::{Pipeline, Step, build_pipeline};
pub use sink::{LogSink, Payload, PayloadSink};
pub use store::Store;
