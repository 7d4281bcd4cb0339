//! Contract: end-to-end component runs through the engine
//!
//! The canonical open→return component against a scripted JSON source,
//! plus the failure paths: an unresolvable target is a fetch error, and
//! the configured failure policy decides whether the rest of the batch
//! still runs.

mod common;

use common::*;
use std::sync::Arc;

use pagewatch_core::config::{FailurePolicy, ScrapeConfig};
use pagewatch_core::{ScrapeEngine, ScrapeOptions};

fn price_component(ticker: &str, name: &str, url: &str) -> pagewatch_core::ComponentSpec {
    component(
        ticker,
        name,
        vec![
            open_step(url_target(url), &[("price", "price")]),
            return_step(&[("entity.price", "price")]),
        ],
    )
}

/// Component whose open step reads its target from a store path nothing
/// ever populates
fn broken_component() -> pagewatch_core::ComponentSpec {
    component(
        "B",
        "Broken",
        vec![
            open_step(store_target("links.next"), &[]),
            return_step(&[]),
        ],
    )
}

#[tokio::test]
async fn open_return_component_emits_expected_payload() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.respond_json("https://example.test/a", r#"{"price": 42}"#);

    let config = ScrapeConfig {
        options: fast_options(),
        components: vec![price_component("X", "Acme", "https://example.test/a")],
    };

    let (sink, payloads) = CollectingSink::new();
    let mut engine = ScrapeEngine::new(&config, fetcher, Box::new(sink)).expect("engine builds");

    engine.run_batch().await.expect("batch succeeds");

    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].source, "scraper");
    assert_eq!(
        payloads[0].data,
        serde_json::json!({"entity": {"ticker": "X", "name": "Acme", "price": 42}})
    );
}

#[tokio::test]
async fn isolate_policy_skips_failing_pipeline_and_continues() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.respond_json("https://example.test/a", r#"{"price": 42}"#);

    let config = ScrapeConfig {
        options: fast_options(),
        components: vec![
            broken_component(),
            price_component("X", "Acme", "https://example.test/a"),
        ],
    };

    let (sink, payloads) = CollectingSink::new();
    let mut engine = ScrapeEngine::new(&config, fetcher, Box::new(sink)).expect("engine builds");

    engine.run_batch().await.expect("batch survives the failure");

    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].data["entity"]["name"], "Acme");
}

#[tokio::test]
async fn abort_policy_stops_the_batch_on_first_failure() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.respond_json("https://example.test/a", r#"{"price": 42}"#);

    let config = ScrapeConfig {
        options: ScrapeOptions {
            failure_policy: FailurePolicy::Abort,
            ..fast_options()
        },
        components: vec![
            broken_component(),
            price_component("X", "Acme", "https://example.test/a"),
        ],
    };

    let (sink, payloads) = CollectingSink::new();
    let mut engine = ScrapeEngine::new(&config, fetcher, Box::new(sink)).expect("engine builds");

    let err = engine.run_batch().await.unwrap_err();
    assert!(err.is_fetch());
    assert!(payloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unsupported_content_type_is_a_distinct_error() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.respond("https://example.test/a", 200, "image/png", "");

    let config = ScrapeConfig {
        options: ScrapeOptions {
            failure_policy: FailurePolicy::Abort,
            ..fast_options()
        },
        components: vec![price_component("X", "Acme", "https://example.test/a")],
    };

    let (sink, _payloads) = CollectingSink::new();
    let mut engine = ScrapeEngine::new(&config, fetcher, Box::new(sink)).expect("engine builds");

    let err = engine.run_batch().await.unwrap_err();
    assert!(matches!(err, pagewatch_core::Error::ContentType(_)));
}

#[tokio::test]
async fn rss_watch_component_emits_on_feed_change() {
    let feed_url = "https://example.test/feed.rss";
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.respond(
        feed_url,
        200,
        "application/rss+xml",
        "<rss><channel><item><guid>1</guid><title>Q3 report</title></item></channel></rss>",
    );

    let config = ScrapeConfig {
        options: fast_options(),
        components: vec![component(
            "X",
            "Acme",
            vec![
                watch_step(
                    watch_target(feed_url, &["channel/item/guid"]),
                    &[("headline", "channel/item/title")],
                ),
                return_step(&[("entity.headline", "headline")]),
            ],
        )],
    };

    let (sink, payloads) = CollectingSink::new();
    let mut engine = ScrapeEngine::new(&config, Arc::clone(&fetcher), Box::new(sink))
        .expect("engine builds");
    engine.prime().await.expect("baselines prime");

    // Feed unchanged: quiet batch
    engine.run_batch().await.expect("batch succeeds");
    assert!(payloads.lock().unwrap().is_empty());

    // New item shows up
    fetcher.respond(
        feed_url,
        200,
        "application/rss+xml",
        "<rss><channel><item><guid>2</guid><title>Buyback announced</title></item></channel></rss>",
    );
    engine.run_batch().await.expect("batch succeeds");

    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].data["entity"]["headline"], "Buyback announced");
}

#[tokio::test]
async fn store_reference_target_follows_a_previous_step() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.respond_json(
        "https://example.test/index",
        r#"{"links": {"quote": "https://example.test/quote"}}"#,
    );
    fetcher.respond_json("https://example.test/quote", r#"{"price": 7}"#);

    let config = ScrapeConfig {
        options: fast_options(),
        components: vec![component(
            "X",
            "Acme",
            vec![
                open_step(
                    url_target("https://example.test/index"),
                    &[("quote_url", "links.quote")],
                ),
                open_step(store_target("quote_url"), &[("price", "price")]),
                return_step(&[("entity.price", "price")]),
            ],
        )],
    };

    let (sink, payloads) = CollectingSink::new();
    let mut engine = ScrapeEngine::new(&config, fetcher, Box::new(sink)).expect("engine builds");

    engine.run_batch().await.expect("batch succeeds");

    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].data["entity"]["price"], 7);
}
