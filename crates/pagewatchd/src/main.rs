// # pagewatchd - Scraping Daemon
//
// Thin integration layer around `pagewatch-core`. The daemon is
// responsible for:
// 1. Reading flat settings from environment variables
// 2. Loading the component tree from a JSON configuration file
// 3. Installing the tracing subscriber
// 4. Building and running the scrape engine
//
// All pipeline logic lives in pagewatch-core; nothing here decides what
// to fetch or when a payload is emitted.
//
// ## Configuration
//
// - `PAGEWATCH_CONFIG`: path to the JSON configuration file (required).
//   The file holds `{"options": {...}, "components": [...]}` as
//   understood by `pagewatch_core::ScrapeConfig`.
// - `PAGEWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `PAGEWATCH_WAIT_TIME`: seconds to sleep after each pipeline run
//   (overrides the file)
// - `PAGEWATCH_REQUEST_TIMEOUT`: per-request timeout in seconds
//   (overrides the file)
// - `PAGEWATCH_USER_AGENT`: fixed user-agent header (overrides the file)
// - `PAGEWATCH_MOCK`: `true` forces watch steps to always report change
// - `PAGEWATCH_FAILURE_POLICY`: `isolate` or `abort`
//
// ## Example
//
// ```bash
// export PAGEWATCH_CONFIG=/etc/pagewatch/components.json
// export PAGEWATCH_WAIT_TIME=5
// export PAGEWATCH_LOG_LEVEL=debug
//
// pagewatchd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use pagewatch_core::{FailurePolicy, HttpFetcher, LogSink, ScrapeConfig, ScrapeEngine};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum PagewatchExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<PagewatchExitCode> for ExitCode {
    fn from(code: PagewatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Flat daemon settings from environment variables
struct Settings {
    config_path: String,
    log_level: String,
    wait_time: Option<u64>,
    request_timeout: Option<u64>,
    user_agent: Option<String>,
    mock: Option<bool>,
    failure_policy: Option<String>,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            config_path: env::var("PAGEWATCH_CONFIG").map_err(|_| {
                anyhow::anyhow!(
                    "PAGEWATCH_CONFIG is required. \
                    Set it via: export PAGEWATCH_CONFIG=/etc/pagewatch/components.json"
                )
            })?,
            log_level: env::var("PAGEWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            wait_time: env::var("PAGEWATCH_WAIT_TIME").ok().and_then(|s| s.parse().ok()),
            request_timeout: env::var("PAGEWATCH_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok()),
            user_agent: env::var("PAGEWATCH_USER_AGENT").ok(),
            mock: env::var("PAGEWATCH_MOCK").ok().map(|s| s == "true" || s == "1"),
            failure_policy: env::var("PAGEWATCH_FAILURE_POLICY").ok(),
        })
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        if self.config_path.is_empty() {
            anyhow::bail!("PAGEWATCH_CONFIG cannot be empty");
        }

        if !std::path::Path::new(&self.config_path).exists() {
            anyhow::bail!(
                "PAGEWATCH_CONFIG file does not exist: {}",
                self.config_path
            );
        }

        if let Some(timeout) = self.request_timeout
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "PAGEWATCH_REQUEST_TIMEOUT must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        if let Some(ref policy) = self.failure_policy {
            match policy.as_str() {
                "isolate" | "abort" => {}
                _ => anyhow::bail!(
                    "PAGEWATCH_FAILURE_POLICY '{}' is not valid. \
                    Valid policies: isolate, abort",
                    policy
                ),
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PAGEWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Load the JSON configuration file and fold the environment
    /// overrides into it
    fn load_config(&self) -> Result<ScrapeConfig> {
        let raw = std::fs::read_to_string(&self.config_path).map_err(|e| {
            anyhow::anyhow!("failed to read {}: {}", self.config_path, e)
        })?;

        let mut config: ScrapeConfig = serde_json::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("failed to parse {}: {}", self.config_path, e)
        })?;

        if let Some(wait_time) = self.wait_time {
            config.options.wait_time_secs = wait_time;
        }
        if let Some(timeout) = self.request_timeout {
            config.options.request_timeout_secs = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            config.options.user_agent = Some(user_agent.clone());
        }
        if let Some(mock) = self.mock {
            config.options.mock = mock;
        }
        if let Some(ref policy) = self.failure_policy {
            config.options.failure_policy = match policy.as_str() {
                "abort" => FailurePolicy::Abort,
                _ => FailurePolicy::Isolate,
            };
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    // Load settings from environment
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PagewatchExitCode::ConfigError.into();
        }
    };

    // Validate settings
    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PagewatchExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match settings.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PagewatchExitCode::ConfigError.into();
    }

    info!("Starting pagewatchd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PagewatchExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(&settings).await {
            Ok(()) => PagewatchExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {}", e);
                PagewatchExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(settings: &Settings) -> Result<()> {
    let config = settings.load_config()?;
    config.validate()?;

    info!(
        "Configuration loaded: {} component(s)",
        config.components.len()
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.options));
    let sink = Box::new(LogSink::new());

    let mut engine = ScrapeEngine::new(&config, fetcher, sink)?;

    info!("Starting scrape engine");
    engine.run().await?;

    Ok(())
}
