//! Extraction payload normalization.
//!
//! # Responsibility
//! - Convert a loosely typed JSON payload into a [`Plan`].
//! - Apply default coercion to every optional field.
//!
//! # Invariants
//! - Only a non-object top level is an error.
//! - Identifiers are copied as supplied; deduplication happens at render time.
//! - `summary` is capped at [`SUMMARY_MAX_CHARS`] characters.

use crate::model::plan::{Goal, Plan, Task, SUMMARY_MAX_CHARS};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Normalization failure for the payload shape itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Top-level payload is not a JSON object.
    NotAnObject { found: &'static str },
}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "extraction payload must be a JSON object, got {found}")
            }
        }
    }
}

impl Error for NormalizeError {}

/// Normalizes a raw extraction payload into a plan.
///
/// # Errors
/// - `NotAnObject` when `raw` is not a JSON object.
pub fn normalize_plan(raw: &Value) -> Result<Plan, NormalizeError> {
    let Value::Object(root) = raw else {
        return Err(NormalizeError::NotAnObject {
            found: value_kind(raw),
        });
    };

    let summary = truncate_chars(&text_field(root, "summary"), SUMMARY_MAX_CHARS);
    let goals = objects_in(root.get("goals"))
        .map(normalize_goal)
        .collect();

    Ok(Plan { summary, goals })
}

fn normalize_goal(raw: &Map<String, Value>) -> Goal {
    Goal {
        id: text_field(raw, "id"),
        title: text_field(raw, "title"),
        rationale: text_field(raw, "rationale"),
        tasks: objects_in(raw.get("tasks")).map(normalize_task).collect(),
    }
}

fn normalize_task(raw: &Map<String, Value>) -> Task {
    Task {
        id: text_field(raw, "id"),
        title: text_field(raw, "title"),
        details: text_field(raw, "details"),
        depends_on: dependency_list(raw.get("depends_on")),
        estimate_hours: estimate_field(raw.get("estimate_hours")),
    }
}

/// Iterates the object entries of an optional array; everything else is
/// skipped.
fn objects_in(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).map(coerce_text).unwrap_or_default()
}

/// String coercion: strings verbatim, null empty, other values as JSON text.
pub(crate) fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

fn dependency_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(coerce_text(item)),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            })
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

fn estimate_field(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Keeps the first `max_chars` characters.
pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_plan, NormalizeError};
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_empty_values() {
        let plan = normalize_plan(&json!({
            "goals": [{ "tasks": [{}] }]
        }))
        .unwrap();

        assert_eq!(plan.summary, "");
        let goal = &plan.goals[0];
        assert_eq!(goal.id, "");
        assert_eq!(goal.title, "");
        assert_eq!(goal.rationale, "");
        let task = &goal.tasks[0];
        assert_eq!(task.id, "");
        assert!(task.depends_on.is_empty());
        assert_eq!(task.estimate_hours, None);
    }

    #[test]
    fn summary_is_truncated_to_120_characters() {
        let raw = "x".repeat(200);
        let plan = normalize_plan(&json!({ "summary": raw })).unwrap();
        assert_eq!(plan.summary, "x".repeat(120));
    }

    #[test]
    fn summary_truncation_counts_characters() {
        let raw = "요".repeat(130);
        let plan = normalize_plan(&json!({ "summary": raw })).unwrap();
        assert_eq!(plan.summary.chars().count(), 120);
    }

    #[test]
    fn non_string_summary_is_coerced() {
        let plan = normalize_plan(&json!({ "summary": 42 })).unwrap();
        assert_eq!(plan.summary, "42");
    }

    #[test]
    fn wrong_shaped_collections_are_tolerated() {
        let plan = normalize_plan(&json!({
            "goals": [
                "not a goal",
                { "title": "Ship", "tasks": "nope" },
                { "title": "Test", "tasks": [7, { "title": "Write", "depends_on": "T1" }] }
            ]
        }))
        .unwrap();

        assert_eq!(plan.goals.len(), 2);
        assert!(plan.goals[0].tasks.is_empty());
        assert_eq!(plan.goals[1].tasks.len(), 1);
        assert_eq!(plan.goals[1].tasks[0].depends_on, vec!["T1".to_string()]);
    }

    #[test]
    fn dependency_entries_are_coerced_and_filtered() {
        let plan = normalize_plan(&json!({
            "goals": [{ "tasks": [{ "depends_on": ["T1", 2, null, {"id": "x"}] }] }]
        }))
        .unwrap();
        assert_eq!(
            plan.goals[0].tasks[0].depends_on,
            vec!["T1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn estimate_accepts_numbers_and_numeric_strings() {
        let plan = normalize_plan(&json!({
            "goals": [{ "tasks": [
                { "estimate_hours": 1.5 },
                { "estimate_hours": " 3 " },
                { "estimate_hours": null },
                { "estimate_hours": "soon" }
            ] }]
        }))
        .unwrap();
        let estimates: Vec<Option<f64>> = plan.goals[0]
            .tasks
            .iter()
            .map(|task| task.estimate_hours)
            .collect();
        assert_eq!(estimates, vec![Some(1.5), Some(3.0), None, None]);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = normalize_plan(&json!(["goals"])).unwrap_err();
        assert_eq!(err, NormalizeError::NotAnObject { found: "array" });
    }

    #[test]
    fn supplied_ids_are_not_deduplicated() {
        let plan = normalize_plan(&json!({
            "goals": [{ "id": "G1" }, { "id": "G1" }]
        }))
        .unwrap();
        assert_eq!(plan.goals[0].id, "G1");
        assert_eq!(plan.goals[1].id, "G1");
    }
}
