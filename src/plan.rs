//! Plan computation shared by every resource.
//!
//! Resources do not plan individually: the difference between prior and
//! proposed state is worked out against the resource schema, which knows
//! which attributes are computed, which have defaults, and which force
//! replacement.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed`.
///
/// - no prior state: create, with schema defaults filled in
/// - null proposed state: destroy, planned state is null
/// - otherwise: update; computed attributes the configuration leaves null
///   keep their prior value, and a change to a force-new attribute requires
///   replacement
pub fn plan_change(
    schema: &Schema,
    prior: Option<Value>,
    proposed: Value,
) -> Result<PlanResult, ProviderError> {
    let prior = match prior {
        Some(Value::Null) | None => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => return Err(not_an_object("prior state", &other)),
    };

    let proposed = match proposed {
        Value::Null => return Ok(plan_destroy(prior.unwrap_or_default())),
        Value::Object(map) => map,
        other => return Err(not_an_object("proposed state", &other)),
    };

    let mut planned = proposed;

    let Some(prior) = prior else {
        apply_defaults(schema, &mut planned);
        let changes = sorted_keys(&planned, &Map::new())
            .into_iter()
            .filter_map(|key| present(&planned, &key).map(|v| AttributeChange::added(key, v.clone())))
            .collect();
        return Ok(PlanResult::with_changes(Value::Object(planned), changes, false));
    };

    for (name, attr) in &schema.block.attributes {
        if attr.flags.computed && present(&planned, name).is_none() {
            if let Some(previous) = present(&prior, name) {
                planned.insert(name.clone(), previous.clone());
            }
        }
    }
    apply_defaults(schema, &mut planned);

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for key in sorted_keys(&prior, &planned) {
        let change = match (present(&prior, &key), present(&planned, &key)) {
            (Some(before), Some(after)) if before != after => {
                AttributeChange::modified(key.as_str(), before.clone(), after.clone())
            },
            (None, Some(after)) => AttributeChange::added(key.as_str(), after.clone()),
            (Some(before), None) => AttributeChange::removed(key.as_str(), before.clone()),
            _ => continue,
        };
        if schema.attribute(&key).is_some_and(|attr| attr.force_new) {
            requires_replace = true;
        }
        changes.push(change);
    }

    if changes.is_empty() {
        Ok(PlanResult::no_change(Value::Object(planned)))
    } else {
        Ok(PlanResult::with_changes(Value::Object(planned), changes, requires_replace))
    }
}

fn plan_destroy(prior: Map<String, Value>) -> PlanResult {
    let changes = sorted_keys(&prior, &Map::new())
        .into_iter()
        .filter_map(|key| present(&prior, &key).map(|v| AttributeChange::removed(key, v.clone())))
        .collect();
    PlanResult::with_changes(Value::Null, changes, false)
}

fn apply_defaults(schema: &Schema, state: &mut Map<String, Value>) {
    for (name, attr) in &schema.block.attributes {
        if let Some(default) = &attr.default {
            if present(state, name).is_none() {
                state.insert(name.clone(), default.clone());
            }
        }
    }
}

fn present<'a>(state: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    state.get(key).filter(|v| !v.is_null())
}

fn sorted_keys(a: &Map<String, Value>, b: &Map<String, Value>) -> BTreeSet<String> {
    a.keys().chain(b.keys()).cloned().collect()
}

fn not_an_object(what: &str, value: &Value) -> ProviderError {
    ProviderError::Validation(format!(
        "{} must be an object, got {}",
        what,
        crate::state::json_kind(value)
    ))
}
