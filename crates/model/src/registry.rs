//! The `INCLUDEELEMENT` registry (spec §6): a process-wide map from
//! `(concept, type)` to a handler, and the dependency-fixpoint resolver
//! that drives a batch of elements to completion.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use hydrosched_core::{HkError, HkResult, Id};

/// `(ok, deps)`: when `ok=false`, `deps` lists ids whose presence must
/// be ensured before this element can be retried.
pub type HandlerResult = (bool, Vec<Id>);

pub type Handler =
    Box<dyn Fn(&mut dyn Any, &mut dyn Any, &Id, &serde_json::Value) -> HandlerResult + Send + Sync>;

static REGISTRY: Lazy<Mutex<HashMap<(String, String), Handler>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers a handler for `(concept, type)`. Called once per concrete
/// element type at process startup.
pub fn register(concept: impl Into<String>, kind: impl Into<String>, handler: Handler) {
    let mut reg = REGISTRY.lock().expect("INCLUDEELEMENT registry poisoned");
    reg.insert((concept.into(), kind.into()), handler);
}

/// A tagged `(concept, type, instance, value)` dictionary (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub concept: String,
    pub kind: String,
    pub instance: String,
    pub value: serde_json::Value,
}

impl Element {
    pub fn id(&self) -> Id {
        Id::new(self.concept.clone(), self.instance.clone())
    }
}

/// Drives `elements` to a fixed point against the registered handlers.
/// Each pass retries every still-unresolved element; an element that
/// reports `ok=true` is removed from the pending set. If a full pass
/// makes no progress, the remaining elements fail with
/// *unresolved elements*, annotated with a cyclic-dependency note when
/// the unresolved set's own dependency edges form a cycle.
pub fn resolve(
    elements: Vec<Element>,
    toplevel_map: &mut dyn Any,
    lowlevel_map: &mut dyn Any,
) -> HkResult<()> {
    let reg = REGISTRY.lock().expect("INCLUDEELEMENT registry poisoned");
    let mut pending = elements;
    let mut resolved_ids: HashSet<Id> = HashSet::new();

    loop {
        let mut progressed = false;
        let mut next_pending = Vec::new();
        let mut last_deps: HashMap<Id, Vec<Id>> = HashMap::new();

        for element in pending {
            let key = (element.concept.clone(), element.kind.clone());
            let handler = reg.get(&key).ok_or_else(|| {
                HkError::Construction(format!(
                    "no INCLUDEELEMENT handler registered for ({}, {})",
                    element.concept, element.kind
                ))
            })?;
            let id = element.id();
            let (ok, deps) = handler(toplevel_map, lowlevel_map, &id, &element.value);
            if ok {
                resolved_ids.insert(id);
                progressed = true;
            } else {
                last_deps.insert(id, deps);
                next_pending.push(element);
            }
        }

        if next_pending.is_empty() {
            return Ok(());
        }
        if !progressed {
            let mut graph: DiGraphMap<&Id, ()> = DiGraphMap::new();
            for (id, deps) in &last_deps {
                graph.add_node(id);
                for dep in deps {
                    graph.add_node(dep);
                    graph.add_edge(id, dep, ());
                }
            }
            let cyclic = is_cyclic_directed(&graph);
            let reasons: Vec<String> = next_pending
                .iter()
                .map(|e| {
                    let id = e.id();
                    let deps = last_deps.get(&id).cloned().unwrap_or_default();
                    format!(
                        "{}({}) waiting on [{}]{}",
                        e.concept,
                        e.instance,
                        deps.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", "),
                        if cyclic { " (cyclic dependency)" } else { "" }
                    )
                })
                .collect();
            return Err(HkError::UnresolvedElements(reasons));
        }
        pending = next_pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_json_round_trip() {
        let element = Element {
            concept: "Flow".into(),
            kind: "Simple".into(),
            instance: "Plant1".into(),
            value: serde_json::json!({"ub": 10.0}),
        };
        let json = serde_json::to_string(&element).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), element.id());
        assert_eq!(back.value, element.value);
    }

    #[test]
    fn test_resolve_succeeds_when_handler_always_ok() {
        register("TestConcept", "TestType", Box::new(|_, _, _id, _value| (true, vec![])));
        let elements = vec![Element {
            concept: "TestConcept".into(),
            kind: "TestType".into(),
            instance: "A".into(),
            value: serde_json::Value::Null,
        }];
        let mut top: () = ();
        let mut low: () = ();
        resolve(elements, &mut top, &mut low).unwrap();
    }

    #[test]
    fn test_resolve_fails_unresolved_when_deps_never_satisfy() {
        register(
            "StuckConcept",
            "StuckType",
            Box::new(|_, _, _id, _value| (false, vec![Id::new("Missing", "X")])),
        );
        let elements = vec![Element {
            concept: "StuckConcept".into(),
            kind: "StuckType".into(),
            instance: "A".into(),
            value: serde_json::Value::Null,
        }];
        let mut top: () = ();
        let mut low: () = ();
        let err = resolve(elements, &mut top, &mut low).unwrap_err();
        assert!(matches!(err, HkError::UnresolvedElements(_)));
    }
}
