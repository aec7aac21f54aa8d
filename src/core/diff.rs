//! Structural diff of two JSON documents.
//!
//! Arrays are compared as sets: an element present on both sides is never
//! reported, whatever its position or how often it repeats. Paths use the
//! `root['key'][index]` notation.

use crate::domain::model::DiffReport;
use serde_json::{json, Value};
use std::collections::HashMap;

pub fn diff_values(old: &Value, new: &Value) -> DiffReport {
    let mut report = DiffReport::default();
    diff_at("root", old, new, &mut report);
    report
}

fn diff_at(path: &str, old: &Value, new: &Value, report: &mut DiffReport) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, old_value) in old_map {
                let child = key_path(path, key);
                match new_map.get(key) {
                    Some(new_value) => diff_at(&child, old_value, new_value, report),
                    None => {
                        report
                            .dictionary_item_removed
                            .insert(child, old_value.clone());
                    }
                }
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    report
                        .dictionary_item_added
                        .insert(key_path(path, key), new_value.clone());
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            diff_arrays(path, old_items, new_items, report);
        }
        _ if old == new => {}
        _ => {
            let (old_type, new_type) = (type_name(old), type_name(new));
            if old_type != new_type {
                report.type_changes.insert(
                    path.to_string(),
                    json!({
                        "old_type": old_type,
                        "new_type": new_type,
                        "old_value": old,
                        "new_value": new,
                    }),
                );
            } else {
                report.values_changed.insert(
                    path.to_string(),
                    json!({ "old_value": old, "new_value": new }),
                );
            }
        }
    }
}

fn diff_arrays(path: &str, old_items: &[Value], new_items: &[Value], report: &mut DiffReport) {
    let old_keys = first_positions(old_items);
    let new_keys = first_positions(new_items);

    for (key, index) in &old_keys {
        if !new_keys.contains_key(key) {
            report
                .iterable_item_removed
                .insert(index_path(path, *index), old_items[*index].clone());
        }
    }

    let mut added: Vec<usize> = new_keys
        .iter()
        .filter(|(key, _)| !old_keys.contains_key(*key))
        .map(|(_, index)| *index)
        .collect();
    added.sort_unstable();
    for index in added {
        report
            .iterable_item_added
            .insert(index_path(path, index), new_items[index].clone());
    }
}

/// Canonical form -> index of its first occurrence.
fn first_positions(items: &[Value]) -> HashMap<String, usize> {
    let mut positions = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        positions.entry(canonical_key(item)).or_insert(index);
    }
    positions
}

/// Order-independent fingerprint: object keys sorted, array elements sorted and deduplicated.
fn canonical_key(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, String)> =
                map.iter().map(|(k, v)| (k, canonical_key(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let mut keys: Vec<String> = items.iter().map(canonical_key).collect();
            keys.sort_unstable();
            keys.dedup();
            format!("[{}]", keys.join(","))
        }
        scalar => scalar.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn key_path(parent: &str, key: &str) -> String {
    format!("{}['{}']", parent, key.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents_have_no_diff() {
        let doc = json!({"cpes": ["cpe:/a:vendor:product:1.0"], "count": 1});
        let report = diff_values(&doc, &doc.clone());
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn test_array_order_is_ignored() {
        let old = json!({
            "cpes": ["a", "b", "c"],
            "nested": [{"id": 1, "tags": ["x", "y"]}, {"id": 2, "tags": []}]
        });
        let new = json!({
            "cpes": ["c", "a", "b"],
            "nested": [{"tags": [], "id": 2}, {"tags": ["y", "x"], "id": 1}]
        });

        assert!(diff_values(&old, &new).is_empty());
    }

    #[test]
    fn test_scalar_change_reports_exact_path() {
        let report = diff_values(&json!({"x": 1}), &json!({"x": 2}));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"values_changed": {"root['x']": {"old_value": 1, "new_value": 2}}})
        );
    }

    #[test]
    fn test_nested_scalar_change() {
        let old = json!({"meta": {"source": "rdb", "version": 3}});
        let new = json!({"meta": {"source": "redis", "version": 3}});
        let report = diff_values(&old, &new);

        assert_eq!(report.len(), 1);
        assert_eq!(
            report.values_changed["root['meta']['source']"],
            json!({"old_value": "rdb", "new_value": "redis"})
        );
    }

    #[test]
    fn test_type_change() {
        let report = diff_values(&json!({"n": 1}), &json!({"n": "1"}));
        assert_eq!(
            report.type_changes["root['n']"],
            json!({"old_type": "int", "new_type": "str", "old_value": 1, "new_value": "1"})
        );

        let report = diff_values(&json!([1]), &json!(null));
        assert_eq!(report.type_changes["root"]["old_type"], "list");
        assert_eq!(report.type_changes["root"]["new_type"], "NoneType");
    }

    #[test]
    fn test_integer_and_float_are_different_types() {
        let report = diff_values(&json!({"n": 1}), &json!({"n": 1.0}));
        assert_eq!(report.type_changes["root['n']"]["new_type"], "float");
    }

    #[test]
    fn test_dictionary_items_added_and_removed() {
        let old = json!({"keep": true, "gone": 1});
        let new = json!({"keep": true, "fresh": [1]});
        let report = diff_values(&old, &new);

        assert_eq!(report.dictionary_item_removed["root['gone']"], json!(1));
        assert_eq!(report.dictionary_item_added["root['fresh']"], json!([1]));
        assert!(report.values_changed.is_empty());
    }

    #[test]
    fn test_repetition_is_ignored() {
        let old = json!({"cpes": ["a", "a", "b"], "nested": [["x", "x"], ["y"]]});
        let new = json!({"cpes": ["a", "b"], "nested": [["y"], ["x"]]});
        assert!(diff_values(&old, &new).is_empty());
    }

    #[test]
    fn test_unmatched_items_report_first_index() {
        let old = json!({"cpes": ["a", "b", "d", "d"]});
        let new = json!({"cpes": ["b", "a", "c", "c", "e"]});
        let report = diff_values(&old, &new);

        assert_eq!(report.iterable_item_removed.len(), 1);
        assert_eq!(report.iterable_item_removed["root['cpes'][2]"], json!("d"));
        assert_eq!(report.iterable_item_added.len(), 2);
        assert_eq!(report.iterable_item_added["root['cpes'][2]"], json!("c"));
        assert_eq!(report.iterable_item_added["root['cpes'][4]"], json!("e"));
    }

    #[test]
    fn test_changed_array_element_is_removed_and_added() {
        let old = json!([{"id": 1}, {"id": 2}]);
        let new = json!([{"id": 2}, {"id": 3}]);
        let report = diff_values(&old, &new);

        assert_eq!(report.iterable_item_removed["root[0]"], json!({"id": 1}));
        assert_eq!(report.iterable_item_added["root[1]"], json!({"id": 3}));
    }

    #[test]
    fn test_quotes_in_keys_are_escaped() {
        let report = diff_values(&json!({"it's": 1}), &json!({"it's": 2}));
        assert!(report.values_changed.contains_key("root['it\\'s']"));
    }
}
