//! Return step
//!
//! The terminal step of every pipeline. Assembles the emitted record from
//! the store: entity metadata plus whatever its store mapping pulls out
//! of the run's extracted fields.

use serde_json::Value;
use tracing::debug;

use crate::config::StepSpec;
use crate::store::Store;

/// Terminal step that assembles the payload data from the store
pub struct ReturnStep {
    spec: StepSpec,
}

impl ReturnStep {
    pub(crate) fn new(spec: StepSpec) -> Self {
        Self { spec }
    }

    /// Build the response record: `{entity: ...}` seeded from the store,
    /// then one entry per declared mapping. Missing source paths yield
    /// null, not an error.
    pub(crate) fn execute(&self, store: &mut Store) -> crate::Result<Value> {
        debug!("running return step");

        let mut response = Store::new();
        response.set(
            "entity",
            store.get("entity").cloned().unwrap_or(Value::Null),
        );

        for (dest, src) in &self.spec.store {
            response.set(dest, store.get(src).cloned().unwrap_or(Value::Null));
        }

        // No further step reads this; recorded for symmetry with the
        // other variants
        store.record_prev(&self.spec)?;

        Ok(response.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Action, EntitySpec};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn builds_response_from_entity_and_mappings() {
        let entity = EntitySpec {
            ticker: "X".to_string(),
            name: "Acme".to_string(),
        };
        let mut store = Store::with_entity(&entity);
        store.set("price", json!(42));

        let step = ReturnStep::new(StepSpec {
            action: Action::Return,
            target: None,
            store: BTreeMap::from([
                ("entity.price".to_string(), "price".to_string()),
                ("entity.volume".to_string(), "volume".to_string()),
            ]),
        });

        let response = step.execute(&mut store).unwrap();
        assert_eq!(
            response,
            json!({
                "entity": {
                    "ticker": "X",
                    "name": "Acme",
                    "price": 42,
                    "volume": null,
                }
            })
        );
    }
}
