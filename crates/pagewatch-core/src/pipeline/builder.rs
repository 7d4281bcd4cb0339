//! Pipeline construction
//!
//! Builds a component's step chain in reverse declaration order, so each
//! step is handed its already-constructed successor, and seeds the
//! component's store with a copy of its entity metadata. All shape
//! problems (empty step list, non-terminal return, dangling open/watch)
//! are configuration errors caught here, before anything runs.

use std::sync::Arc;

use crate::config::{Action, ComponentSpec, ScrapeOptions};
use crate::error::Error;
use crate::fetch::Fetcher;
use crate::pipeline::{OpenStep, Pipeline, ReturnStep, Step, WatchStep};
use crate::store::Store;

/// Build one pipeline from its declarative specification
pub fn build_pipeline(
    component: &ComponentSpec,
    fetcher: Arc<dyn Fetcher>,
    options: &ScrapeOptions,
) -> crate::Result<Pipeline> {
    component.validate()?;

    let mut next: Option<Box<Step>> = None;

    for spec in component.steps.iter().rev() {
        let step = match spec.action {
            Action::Return => {
                if next.is_some() {
                    return Err(Error::config(format!(
                        "component '{}': return step is not terminal",
                        component.entity.name
                    )));
                }
                Step::Return(ReturnStep::new(spec.clone()))
            }
            Action::Open => {
                let successor = successor(&mut next, component, "open")?;
                Step::Open(OpenStep::new(spec.clone(), successor, Arc::clone(&fetcher)))
            }
            Action::Watch => {
                let successor = successor(&mut next, component, "watch")?;
                Step::Watch(WatchStep::new(
                    spec.clone(),
                    successor,
                    Arc::clone(&fetcher),
                    options.mock,
                ))
            }
        };

        next = Some(Box::new(step));
    }

    let head = next.ok_or_else(|| {
        Error::config(format!(
            "component '{}' has no steps",
            component.entity.name
        ))
    })?;

    Ok(Pipeline::new(
        *head,
        Store::with_entity(&component.entity),
        component.entity.name.clone(),
    ))
}

fn successor(
    next: &mut Option<Box<Step>>,
    component: &ComponentSpec,
    action: &str,
) -> crate::Result<Box<Step>> {
    next.take().ok_or_else(|| {
        Error::config(format!(
            "component '{}': {} step has no successor",
            component.entity.name, action
        ))
    })
}
