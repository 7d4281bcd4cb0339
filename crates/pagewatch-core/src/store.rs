//! Per-run scratch store
//!
//! A pipeline run threads one [`Store`] through its step chain. Steps
//! write extracted fields into it under dotted paths and read earlier
//! steps' results back out. The store is created fresh for every batch
//! run of a component (a clone of the component's seed store) and
//! discarded when the run produces a payload or a watch step reports no
//! change.
//!
//! Paths are dotted key sequences (`entity.price`). On reads, a numeric
//! segment indexes into an array (`items.0.title`). On writes,
//! intermediate objects are created as needed; writing through a
//! non-object replaces it.

use serde_json::{Map, Value};

use crate::config::{EntitySpec, StepSpec, TargetSpec};

/// Key under which each step records its own spec for the next step
const PREV_KEY: &str = "_prev";

/// Mutable nested key/value record threaded through one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    root: Value,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Create a seed store carrying entity metadata under `entity`
    pub fn with_entity(entity: &EntitySpec) -> Self {
        let mut store = Self::new();
        store.set(
            "entity",
            serde_json::json!({
                "ticker": entity.ticker,
                "name": entity.name,
            }),
        );
        store
    }

    /// Look up a value at a dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.root, path)
    }

    /// Write a value at a dotted path, creating intermediate objects
    pub fn set(&mut self, path: &str, value: Value) {
        let mut current = &mut self.root;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let map = current.as_object_mut().expect("current is an object");

            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return;
            }

            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    /// Record a step's spec so the next step can resolve relative targets
    /// against it
    pub fn record_prev(&mut self, spec: &StepSpec) -> crate::Result<()> {
        let value = serde_json::to_value(spec)?;
        self.set(PREV_KEY, value);
        Ok(())
    }

    /// Target of the previously executed step, if any
    pub fn prev_target(&self) -> Option<TargetSpec> {
        let value = self.get(PREV_KEY)?.get("target")?;
        serde_json::from_value(value.clone()).ok()
    }

    /// The underlying JSON value (read-only)
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consume the store, yielding the underlying JSON value
    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Walk a dotted path through a JSON value. Numeric segments index into
/// arrays. Shared with JSON body extraction.
pub(crate) fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
