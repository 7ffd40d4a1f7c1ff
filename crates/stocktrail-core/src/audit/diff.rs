//! Field-level differences between two snapshots

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use super::snapshot::FieldMap;

/// One field whose value differs between the old and new snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self {
            field: field.into(),
            old_value,
            new_value,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.field,
            DisplayValue(&self.old_value),
            DisplayValue(&self.new_value)
        )
    }
}

struct DisplayValue<'a>(&'a Value);

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// Compare two optional snapshots
///
/// A missing snapshot means creation (`old` is `None`) or deletion (`new` is
/// `None`) and yields every key of the other side. When both are present only
/// differing keys are returned, in `old`'s key order followed by keys that
/// exist only in `new`. A key missing on one side counts as null there.
pub fn diff(old: Option<&FieldMap>, new: Option<&FieldMap>) -> Vec<FieldChange> {
    match (old, new) {
        (None, None) => Vec::new(),
        (None, Some(new)) => new
            .iter()
            .map(|(field, value)| FieldChange::new(field.as_str(), Value::Null, value.clone()))
            .collect(),
        (Some(old), None) => old
            .iter()
            .map(|(field, value)| FieldChange::new(field.as_str(), value.clone(), Value::Null))
            .collect(),
        (Some(old), Some(new)) => {
            let mut changes = Vec::new();

            for (field, old_value) in old {
                let new_value = new.get(field).unwrap_or(&Value::Null);
                if !values_equal(old_value, new_value) {
                    changes.push(FieldChange::new(
                        field.as_str(),
                        old_value.clone(),
                        new_value.clone(),
                    ));
                }
            }

            for (field, new_value) in new {
                if !old.contains_key(field) && !new_value.is_null() {
                    changes.push(FieldChange::new(
                        field.as_str(),
                        Value::Null,
                        new_value.clone(),
                    ));
                }
            }

            changes
        }
    }
}

/// Scalar equality where numbers compare by value (`1 == 1.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_creation_lists_every_new_field() {
        let new = map(json!({"numero_serie": "ABC123", "statut": "En stock", "prix": null}));
        let changes = diff(None, Some(&new));

        assert_eq!(changes.len(), 3);
        assert!(changes.iter().all(|c| c.old_value.is_null()));
        assert_eq!(changes[0], FieldChange::new("numero_serie", Value::Null, json!("ABC123")));
    }

    #[test]
    fn test_update_reports_only_changed_fields() {
        let old = map(json!({"id": 1, "statut": "En stock", "localisation": "B12"}));
        let new = map(json!({"id": 1, "statut": "En service", "localisation": "B12"}));

        assert_eq!(
            diff(Some(&old), Some(&new)),
            vec![FieldChange::new("statut", json!("En stock"), json!("En service"))]
        );
    }

    #[test]
    fn test_union_of_keys_in_old_order_then_new_only() {
        let old = map(json!({"b": 1, "a": 2, "gone": "x"}));
        let new = map(json!({"fresh": true, "a": 3, "b": 1}));

        let fields: Vec<String> = diff(Some(&old), Some(&new))
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(fields, ["a", "gone", "fresh"]);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let old = map(json!({"prix": 1, "ram": 16}));
        let new = map(json!({"prix": 1.0, "ram": 32}));

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "ram");
    }

    #[test]
    fn test_display() {
        let change = FieldChange::new("statut", json!("En stock"), json!("En service"));
        assert_eq!(change.to_string(), "statut: En stock -> En service");

        let change = FieldChange::new("prix", Value::Null, json!(199.5));
        assert_eq!(change.to_string(), "prix: null -> 199.5");
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-1000i64..1000).prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ]
    }

    fn field_map() -> impl Strategy<Value = FieldMap> {
        prop::collection::btree_map("[a-f]", scalar(), 0..6)
            .prop_map(|fields| fields.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_identical_snapshots_have_no_changes(old in field_map()) {
            prop_assert!(diff(Some(&old), Some(&old)).is_empty());
        }

        #[test]
        fn prop_deletion_lists_every_old_field(old in field_map()) {
            let changes = diff(Some(&old), None);
            prop_assert_eq!(changes.len(), old.len());
            prop_assert!(changes.iter().all(|c| c.new_value.is_null()));
        }

        #[test]
        fn prop_changed_keys_are_exactly_the_differing_ones(old in field_map(), new in field_map()) {
            let changed: Vec<String> = diff(Some(&old), Some(&new)).into_iter().map(|c| c.field).collect();

            let mut expected: Vec<String> = old.keys().cloned().collect();
            expected.extend(new.keys().filter(|k| !old.contains_key(*k)).cloned());
            expected.retain(|k| {
                let a = old.get(k).unwrap_or(&Value::Null);
                let b = new.get(k).unwrap_or(&Value::Null);
                !values_equal(a, b)
            });

            prop_assert_eq!(changed, expected);
        }
    }
}
