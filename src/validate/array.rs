use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;
use serde_json::Value;

use super::{type_mismatch, Walk};
use crate::pointer::Pointer;
use crate::report::{ValidationResult, ViolationKind};
use crate::schema::{Additional, ArrayConstraints, Items, SchemaNode};

pub(super) fn check(
    walk: &mut Walk<'_>,
    node: &SchemaNode,
    c: &ArrayConstraints,
    value: &Value,
    path: &Pointer,
) -> ValidationResult {
    let Value::Array(items) = value else {
        return type_mismatch(node, "array", value, path);
    };
    let mut out = ValidationResult::new();

    let count = items.len() as u64;
    if let Some(min) = c.min_items {
        if count < min {
            out.record(path, node.keyword("minItems"), ViolationKind::TooFewItems { count, min });
        }
    }
    if let Some(max) = c.max_items {
        if count > max {
            out.record(path, node.keyword("maxItems"), ViolationKind::TooManyItems { count, max });
        }
    }

    if c.unique_items == Some(true) {
        let mut seen: HashMap<Canon, usize> = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match seen.entry(Canon::of(item)) {
                Entry::Occupied(first) => out.record(
                    path,
                    node.keyword("uniqueItems"),
                    ViolationKind::DuplicateItems {
                        first: *first.get(),
                        duplicate: index,
                    },
                ),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }
    }

    if let Some(contains) = c.contains {
        let found = items
            .iter()
            .enumerate()
            .any(|(index, item)| walk.node(contains, item, &path.index(index)).is_valid());
        if !found {
            out.record(path, node.keyword("contains"), ViolationKind::ContainsNoMatch);
        }
    }

    match &c.items {
        None => {}
        Some(Items::List(id)) => {
            for (index, item) in items.iter().enumerate() {
                out.merge(walk.node(*id, item, &path.index(index)));
            }
        }
        Some(Items::Tuple(ids)) => {
            if c.additional_items == Some(Additional::Allowed(false)) && items.len() > ids.len() {
                out.record(
                    path,
                    node.keyword("additionalItems"),
                    ViolationKind::AdditionalItems {
                        count,
                        max: ids.len() as u64,
                    },
                );
            }
            for (index, item) in items.iter().enumerate() {
                let schema = match ids.get(index) {
                    Some(id) => Some(*id),
                    None => match c.additional_items {
                        Some(Additional::Schema(id)) => Some(id),
                        _ => None,
                    },
                };
                if let Some(id) = schema {
                    out.merge(walk.node(id, item, &path.index(index)));
                }
            }
        }
    }
    out
}

/// Hashable canonical form for deep equality: `1 == 1.0`, key order ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Canon {
    Null,
    Bool(bool),
    Int(i128),
    Float(OrderedFloat<f64>),
    Str(String),
    Array(Vec<Canon>),
    Object(BTreeMap<String, Canon>),
}

impl Canon {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Canon::Null,
            Value::Bool(b) => Canon::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Canon::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Canon::Int(i128::from(u))
                } else {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.fract() == 0.0 && f.abs() < 1e38 {
                        Canon::Int(f as i128)
                    } else {
                        Canon::Float(OrderedFloat(f))
                    }
                }
            }
            Value::String(s) => Canon::Str(s.clone()),
            Value::Array(items) => Canon::Array(items.iter().map(Canon::of).collect()),
            Value::Object(map) => Canon::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Canon::of(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::schema::SchemaDocument;

    fn kinds(schema: Value, value: Value) -> Vec<ViolationKind> {
        let doc = SchemaDocument::parse(&schema).unwrap();
        doc.validate(&value).into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn one_violation_per_duplicate() {
        let schema = json!({"type": "array", "uniqueItems": true});
        assert_eq!(
            kinds(schema.clone(), json!([1, 2, 2])),
            [ViolationKind::DuplicateItems { first: 1, duplicate: 2 }]
        );
        assert_eq!(kinds(schema.clone(), json!([1, 1, 1])).len(), 2);
        assert!(kinds(schema, json!([1, "1", [1], {"1": 1}])).is_empty());
    }

    #[test]
    fn canonical_equality() {
        assert_eq!(Canon::of(&json!(1)), Canon::of(&json!(1.0)));
        assert_eq!(
            Canon::of(&json!({"a": 1, "b": [true, null]})),
            Canon::of(&json!({"b": [true, null], "a": 1.0}))
        );
        assert_ne!(Canon::of(&json!([1, 2])), Canon::of(&json!([2, 1])));
        assert_ne!(Canon::of(&json!(0.5)), Canon::of(&json!(1)));
    }

    #[test]
    fn tuple_items_and_additional() {
        let schema = json!({
            "type": "array",
            "items": [{"type": "string"}, {"type": "number"}],
            "additionalItems": false
        });
        assert!(kinds(schema.clone(), json!(["a"])).is_empty());
        assert!(kinds(schema.clone(), json!(["a", 1])).is_empty());
        assert_eq!(
            kinds(schema.clone(), json!(["a", 1, null, null])),
            [ViolationKind::AdditionalItems { count: 4, max: 2 }]
        );
        assert_eq!(
            kinds(schema, json!([1, 1])),
            [ViolationKind::TypeMismatch { expected: "string", actual: "integer" }]
        );

        let open = json!({
            "type": "array",
            "items": [{"type": "string"}],
            "additionalItems": {"type": "boolean"}
        });
        assert!(kinds(open.clone(), json!(["a", true, false])).is_empty());
        let doc = SchemaDocument::parse(&open).unwrap();
        let result = doc.validate(&json!(["a", true, 3]));
        assert_eq!(result.errors()[0].document_path.to_string(), "/2");
        assert_eq!(result.errors()[0].schema_path.to_string(), "/additionalItems/type");
    }

    #[test]
    fn contains_needs_one_match() {
        let schema = json!({"type": "array", "contains": {"type": "number", "minimum": 5}});
        assert!(kinds(schema.clone(), json!([1, "x", 7])).is_empty());
        assert_eq!(kinds(schema.clone(), json!([1, 2])), [ViolationKind::ContainsNoMatch]);
        assert_eq!(kinds(schema, json!([])), [ViolationKind::ContainsNoMatch]);
    }

    #[test]
    fn list_items_report_element_paths() {
        let doc = SchemaDocument::parse(&json!({
            "type": "array",
            "maxItems": 2,
            "items": {"type": "integer"}
        }))
        .unwrap();
        let result = doc.validate(&json!([1, "two", 3]));
        let paths: Vec<_> = result
            .errors()
            .iter()
            .map(|v| (v.document_path.to_string(), v.schema_path.to_string()))
            .collect();
        assert_eq!(
            paths,
            [
                ("".to_string(), "/maxItems".to_string()),
                ("/1".to_string(), "/items/type".to_string())
            ]
        );
    }
}
