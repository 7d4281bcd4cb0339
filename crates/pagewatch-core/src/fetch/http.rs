//! reqwest-backed fetcher
//!
//! One GET per call, no retries: retry policy belongs to the embedding
//! process, not the transport. The request timeout is always set, and a
//! timeout surfaces as an ordinary fetch error.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::config::ScrapeOptions;
use crate::error::Error;
use crate::fetch::{FetchedResponse, Fetcher};

/// User-agents picked from when no fixed one is configured
const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:132.0) \
     Gecko/20100101 Firefox/132.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
];

/// HTTP fetcher used by production pipelines
pub struct HttpFetcher {
    /// Shared client when sessions are reused; `None` builds a fresh
    /// client per request
    client: Option<reqwest::Client>,

    /// Per-request timeout
    timeout: Duration,

    /// Fixed user-agent; random pick from the pool when absent
    user_agent: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher from the global scraping options
    pub fn new(options: &ScrapeOptions) -> Self {
        let timeout = Duration::from_secs(options.request_timeout_secs);
        let client = if options.use_sessions {
            Some(build_client(timeout))
        } else {
            None
        };

        Self {
            client,
            timeout,
            user_agent: options.user_agent.clone(),
        }
    }

    fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(ua) => ua.clone(),
            None => USER_AGENT_POOL
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(USER_AGENT_POOL[0])
                .to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> crate::Result<FetchedResponse> {
        let client = match &self.client {
            Some(client) => client.clone(),
            None => build_client(self.timeout),
        };

        let response = client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|e| Error::fetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("reading body of {} failed: {}", url, e)))?;

        Ok(FetchedResponse {
            status,
            content_type,
            body,
        })
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
