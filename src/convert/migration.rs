//! Decision-table payload schema upgrades.
//!
//! Version 1 payloads (no `modelVersion`) keep each rule's input entry as one
//! string such as `== "gold"`. Version 2 splits it into `<id>_operator` and
//! `<id>_expression`. Version 3 renames the collection operators.

use serde_json::{Map, Value};

pub const CURRENT_DECISION_TABLE_VERSION: u32 = 3;

/// Longest first so `NOT IN` wins over `IN` and `<=` over `<`.
const V1_OPERATORS: [&str; 12] = [
    "NOT ANY", "NOT IN", "NONE", "ANY", "ALL", "IN", "==", "!=", "<=", ">=", "<", ">",
];

const V3_COLLECTION_OPERATORS: [(&str, &str); 6] = [
    ("IN", "IS IN"),
    ("NOT IN", "IS NOT IN"),
    ("ANY", "ANY OF"),
    ("NOT ANY", "NONE OF"),
    ("ALL", "ALL OF"),
    ("NONE", "NONE OF"),
];

pub fn decision_table_version(payload: &Value) -> u32 {
    match payload.get("modelVersion") {
        Some(Value::String(version)) => version.trim().parse().unwrap_or(1),
        Some(Value::Number(version)) => version.as_u64().map(|v| v as u32).unwrap_or(1),
        _ => 1,
    }
}

/// Upgrades a decision-table payload to the current schema. Payloads already
/// at (or past) the current version come back untouched.
pub fn migrate_decision_table(mut payload: Value) -> Value {
    let version = decision_table_version(&payload);
    if version >= CURRENT_DECISION_TABLE_VERSION {
        return payload;
    }

    let input_ids: Vec<String> = payload
        .get("inputExpressions")
        .and_then(Value::as_array)
        .map(|inputs| {
            inputs
                .iter()
                .filter_map(|input| input.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(rules) = payload.get_mut("rules").and_then(Value::as_array_mut) {
        for rule in rules.iter_mut().filter_map(Value::as_object_mut) {
            if version < 2 {
                split_input_entries(rule, &input_ids);
            }
            rename_collection_operators(rule, &input_ids);
        }
    }

    if let Some(object) = payload.as_object_mut() {
        object.insert(
            "modelVersion".to_string(),
            Value::String(CURRENT_DECISION_TABLE_VERSION.to_string()),
        );
    }
    payload
}

fn split_input_entries(rule: &mut Map<String, Value>, input_ids: &[String]) {
    for id in input_ids {
        let Some(entry) = rule.remove(id) else {
            continue;
        };
        let (operator, expression) = split_entry(entry.as_str().unwrap_or_default());
        rule.insert(format!("{}_operator", id), Value::String(operator));
        rule.insert(format!("{}_expression", id), Value::String(expression));
    }
}

fn split_entry(entry: &str) -> (String, String) {
    let entry = entry.trim();
    if entry.is_empty() || entry == "-" {
        return (String::new(), "-".to_string());
    }

    for operator in V1_OPERATORS {
        if let Some(rest) = entry.strip_prefix(operator) {
            let word_operator = operator.chars().all(|c| c.is_ascii_alphabetic() || c == ' ');
            // "INDEX > 3" must not be read as the IN operator.
            if word_operator && !rest.is_empty() && !rest.starts_with([' ', '(', '"']) {
                continue;
            }
            return (operator.to_string(), rest.trim().to_string());
        }
    }
    ("==".to_string(), entry.to_string())
}

fn rename_collection_operators(rule: &mut Map<String, Value>, input_ids: &[String]) {
    for id in input_ids {
        let key = format!("{}_operator", id);
        let Some(Value::String(operator)) = rule.get_mut(&key) else {
            continue;
        };
        if let Some((_, renamed)) = V3_COLLECTION_OPERATORS
            .iter()
            .find(|(old, _)| *old == operator.as_str())
        {
            *operator = renamed.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_table() -> Value {
        json!({
            "id": "definition_d1",
            "key": "d1",
            "name": "Discount",
            "inputExpressions": [{"id": "in1"}, {"id": "in2"}, {"id": "in3"}],
            "outputExpressions": [{"id": "out1"}],
            "rules": [
                {"in1": "== \"gold\"", "in2": "NOT IN (1, 2)", "in3": "-", "out1": "0.1"},
                {"in1": "\"silver\"", "in2": ">= 10", "in3": "", "out1": "0.05"}
            ]
        })
    }

    #[test]
    fn test_v1_is_upgraded_to_current() {
        let migrated = migrate_decision_table(legacy_table());
        assert_eq!(migrated["modelVersion"], "3");
        assert_eq!(decision_table_version(&migrated), CURRENT_DECISION_TABLE_VERSION);

        let first = &migrated["rules"][0];
        assert!(first.get("in1").is_none());
        assert_eq!(first["in1_operator"], "==");
        assert_eq!(first["in1_expression"], "\"gold\"");
        assert_eq!(first["in2_operator"], "IS NOT IN");
        assert_eq!(first["in2_expression"], "(1, 2)");
        assert_eq!(first["in3_operator"], "");
        assert_eq!(first["in3_expression"], "-");
        assert_eq!(first["out1"], "0.1");

        let second = &migrated["rules"][1];
        assert_eq!(second["in1_operator"], "==");
        assert_eq!(second["in1_expression"], "\"silver\"");
        assert_eq!(second["in2_operator"], ">=");
        assert_eq!(second["in2_expression"], "10");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let once = migrate_decision_table(legacy_table());
        let twice = migrate_decision_table(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_v2_only_renames_operators() {
        let v2 = json!({
            "modelVersion": "2",
            "inputExpressions": [{"id": "in1"}],
            "rules": [{"in1_operator": "ANY", "in1_expression": "[1]"}]
        });
        let migrated = migrate_decision_table(v2);
        assert_eq!(migrated["rules"][0]["in1_operator"], "ANY OF");
        assert_eq!(migrated["rules"][0]["in1_expression"], "[1]");
    }

    #[test]
    fn test_word_operator_needs_a_boundary() {
        assert_eq!(
            split_entry("INDEX > 3"),
            ("==".to_string(), "INDEX > 3".to_string())
        );
        assert_eq!(split_entry("IN (\"a\")"), ("IN".to_string(), "(\"a\")".to_string()));
        assert_eq!(split_entry("< 5"), ("<".to_string(), "5".to_string()));
    }
}
