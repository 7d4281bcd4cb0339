//! Configuration types for the scraping pipeline
//!
//! This module defines all configuration structures used throughout the
//! crate. The tree is consumed fully resolved: loading and merging are the
//! embedding process's concern.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::Store;

/// Main scraping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Global scraping options
    #[serde(default)]
    pub options: ScrapeOptions,

    /// Components to run, in batch order
    pub components: Vec<ComponentSpec>,
}

impl ScrapeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.components.is_empty() {
            return Err(crate::Error::config("no components configured"));
        }

        self.options.validate()?;

        for component in &self.components {
            component.validate()?;
        }

        Ok(())
    }
}

/// Global scraping options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeOptions {
    /// Seconds to sleep after each pipeline run within a batch
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,

    /// Reuse one HTTP client (and its connection pool) across requests.
    /// When false, every request builds a fresh client.
    #[serde(default = "default_use_sessions")]
    pub use_sessions: bool,

    /// Fixed user-agent header. When absent, a random one is picked per
    /// request from a built-in pool.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Force watch steps to always report a change
    #[serde(default)]
    pub mock: bool,

    /// Per-request timeout in seconds. A timeout surfaces as an ordinary
    /// fetch error.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// What a pipeline failure does to the rest of the batch
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl ScrapeOptions {
    /// Validate the options
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.request_timeout_secs == 0 {
            return Err(crate::Error::config("request timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            wait_time_secs: default_wait_time_secs(),
            use_sessions: default_use_sessions(),
            user_agent: None,
            mock: false,
            request_timeout_secs: default_request_timeout_secs(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Engine behavior when a pipeline run fails mid-batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure with pipeline context and continue with the next
    /// pipeline
    #[default]
    Isolate,

    /// Abort the batch loop on the first failing pipeline
    Abort,
}

/// Entity metadata attached to every payload a component emits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Ticker symbol
    #[serde(default)]
    pub ticker: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,
}

/// One independently scheduled pipeline: entity metadata plus an ordered
/// list of step specifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Entity this component scrapes data for
    #[serde(default)]
    pub entity: EntitySpec,

    /// Steps in declaration order; the last one must be a return step
    pub steps: Vec<StepSpec>,
}

impl ComponentSpec {
    /// Validate the component's step list against the pipeline invariants:
    /// non-empty, exactly one terminal return step, every open/watch step
    /// has a successor and a target, every watch step declares elements.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.steps.is_empty() {
            return Err(crate::Error::config(format!(
                "component '{}' has no steps",
                self.entity.name
            )));
        }

        for (index, step) in self.steps.iter().enumerate() {
            let terminal = index == self.steps.len() - 1;
            match step.action {
                Action::Return if !terminal => {
                    return Err(crate::Error::config(format!(
                        "component '{}': return step at index {} is not terminal",
                        self.entity.name, index
                    )));
                }
                Action::Open | Action::Watch if terminal => {
                    return Err(crate::Error::config(format!(
                        "component '{}': {} step at index {} has no successor",
                        self.entity.name, step.action, index
                    )));
                }
                _ => {}
            }

            match step.action {
                Action::Open | Action::Watch => {
                    let target = step.target.as_ref().ok_or_else(|| {
                        crate::Error::config(format!(
                            "component '{}': {} step at index {} has no target",
                            self.entity.name, step.action, index
                        ))
                    })?;

                    if step.action == Action::Watch && target.elements.is_empty() {
                        return Err(crate::Error::config(format!(
                            "component '{}': watch step at index {} declares no elements",
                            self.entity.name, index
                        )));
                    }
                }
                Action::Return => {}
            }
        }

        Ok(())
    }
}

/// Step action. The set is closed; unrecognized actions are rejected when
/// the specification is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Fetch a resource and store extracted fields
    Open,
    /// Fetch a resource and continue only if a watched element changed
    Watch,
    /// Assemble the emitted payload from the store
    Return,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Open => write!(f, "open"),
            Action::Watch => write!(f, "watch"),
            Action::Return => write!(f, "return"),
        }
    }
}

/// Declarative description of one pipeline node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Which step variant to build
    pub action: Action,

    /// Resource locator for open/watch steps
    #[serde(default)]
    pub target: Option<TargetSpec>,

    /// Destination-path in the store → source-path in the parsed body
    /// (for open/watch), or destination-path in the response →
    /// source-path in the store (for return)
    #[serde(default)]
    pub store: BTreeMap<String, String>,
}

/// A resource locator: either a literal URL or a dotted path resolved
/// against the current store at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// How to interpret `value`
    #[serde(rename = "type")]
    pub kind: TargetKind,

    /// Literal URL or store path
    pub value: String,

    /// Watched element paths (watch steps only)
    #[serde(default)]
    pub elements: Vec<String>,
}

/// Target kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// `value` is a literal URL
    Url,
    /// `value` is a dotted path into the store
    Store,
}

impl TargetSpec {
    /// Resolve this target against a store. Literal URLs resolve to
    /// themselves; store references resolve to the referenced value,
    /// stringified. Missing or null store values resolve to `None`.
    pub fn resolve(&self, store: &Store) -> Option<String> {
        match self.kind {
            TargetKind::Url => Some(self.value.clone()),
            TargetKind::Store => match store.get(&self.value)? {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            },
        }
    }
}

fn default_wait_time_secs() -> u64 {
    1
}

fn default_use_sessions() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}
