//! Typed model → schema JSON.
//!
//! `emit(&SchemaDocument::parse(&v)?) == v` for every schema the loader
//! accepts (object key order aside): interpreted keywords are rebuilt from the
//! typed constraints and unknown ones are copied back from `Meta::extra`.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::schema::{Additional, Dependency, Items, NodeId, NodeKind, SchemaDocument};

pub fn emit(doc: &SchemaDocument) -> Value {
    emit_node(doc, doc.root())
}

pub fn emit_node(doc: &SchemaDocument, id: NodeId) -> Value {
    let node = doc.node(id);
    let mut out = Map::new();
    let meta = &node.meta;

    let strings = [
        ("$schema", &meta.schema),
        ("$id", &meta.id),
        ("title", &meta.title),
        ("description", &meta.description),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            out.insert(key.into(), Value::String(value.clone()));
        }
    }

    match &node.kind {
        NodeKind::Ref(reference) => {
            out.insert("$ref".into(), Value::String(reference.reference.clone()));
        }
        NodeKind::String(c) => {
            out.insert("type".into(), "string".into());
            put(&mut out, "minLength", c.min_length.map(Value::from));
            put(&mut out, "maxLength", c.max_length.map(Value::from));
            put(&mut out, "pattern", c.pattern.as_ref().map(|r| r.as_str().into()));
            put(&mut out, "format", c.format.map(|f| f.name().into()));
        }
        NodeKind::Number(c) => {
            out.insert("type".into(), node.kind.name().into());
            put(&mut out, "minimum", c.minimum.clone().map(Value::Number));
            put(&mut out, "maximum", c.maximum.clone().map(Value::Number));
            put(&mut out, "exclusiveMinimum", c.exclusive_minimum.clone().map(Value::Number));
            put(&mut out, "exclusiveMaximum", c.exclusive_maximum.clone().map(Value::Number));
            put(&mut out, "multipleOf", c.multiple_of.clone().map(Value::Number));
        }
        NodeKind::Object(c) => {
            out.insert("type".into(), "object".into());
            put(&mut out, "properties", c.properties.as_ref().map(|p| table(doc, p)));
            put(
                &mut out,
                "required",
                c.required.as_ref().map(|names| names.iter().cloned().map(Value::String).collect::<Value>()),
            );
            put(&mut out, "additionalProperties", c.additional.map(|a| additional(doc, a)));
            put(
                &mut out,
                "patternProperties",
                c.pattern_properties.as_ref().map(|patterns| {
                    patterns
                        .iter()
                        .map(|pp| (pp.regex.as_str().to_string(), emit_node(doc, pp.node)))
                        .collect::<Map<_, _>>()
                        .into()
                }),
            );
            put(
                &mut out,
                "propertyNames",
                c.property_names.as_ref().map(|names| {
                    let mut map = Map::new();
                    if let Some(pattern) = &names.pattern {
                        map.insert("pattern".into(), pattern.as_str().into());
                    }
                    for (key, value) in &names.extra {
                        map.insert(key.clone(), value.clone());
                    }
                    Value::Object(map)
                }),
            );
            put(&mut out, "minProperties", c.min_properties.map(Value::from));
            put(&mut out, "maxProperties", c.max_properties.map(Value::from));
            put(
                &mut out,
                "dependencies",
                c.dependencies.as_ref().map(|deps| {
                    deps.iter()
                        .map(|(name, dep)| {
                            let value = match dep {
                                Dependency::Properties(names) => {
                                    names.iter().cloned().map(Value::String).collect::<Value>()
                                }
                                Dependency::Schema(id) => emit_node(doc, *id),
                            };
                            (name.clone(), value)
                        })
                        .collect::<Map<_, _>>()
                        .into()
                }),
            );
        }
        NodeKind::Array(c) => {
            out.insert("type".into(), "array".into());
            put(
                &mut out,
                "items",
                c.items.as_ref().map(|items| match items {
                    Items::List(id) => emit_node(doc, *id),
                    Items::Tuple(ids) => ids.iter().map(|id| emit_node(doc, *id)).collect::<Value>(),
                }),
            );
            put(&mut out, "additionalItems", c.additional_items.map(|a| additional(doc, a)));
            put(&mut out, "contains", c.contains.map(|id| emit_node(doc, id)));
            put(&mut out, "minItems", c.min_items.map(Value::from));
            put(&mut out, "maxItems", c.max_items.map(Value::from));
            put(&mut out, "uniqueItems", c.unique_items.map(Value::Bool));
        }
        NodeKind::Boolean => {
            out.insert("type".into(), "boolean".into());
        }
        NodeKind::Null => {
            out.insert("type".into(), "null".into());
        }
        NodeKind::AnyOf(branches) | NodeKind::AllOf(branches) | NodeKind::OneOf(branches) => {
            let list = branches.iter().map(|id| emit_node(doc, *id)).collect::<Value>();
            out.insert(node.kind.name().into(), list);
        }
    }

    put(&mut out, "definitions", meta.definitions.as_ref().map(|d| table(doc, d)));
    put(&mut out, "$defs", meta.defs.as_ref().map(|d| table(doc, d)));
    for (key, value) in &meta.extra {
        out.insert(key.clone(), value.clone());
    }
    Value::Object(out)
}

fn put(out: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        out.insert(key.to_string(), value);
    }
}

fn table(doc: &SchemaDocument, entries: &IndexMap<String, NodeId>) -> Value {
    entries
        .iter()
        .map(|(name, id)| (name.clone(), emit_node(doc, *id)))
        .collect::<Map<_, _>>()
        .into()
}

fn additional(doc: &SchemaDocument, additional: Additional) -> Value {
    match additional {
        Additional::Allowed(allowed) => Value::Bool(allowed),
        Additional::Schema(id) => emit_node(doc, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip(schema: Value) {
        let doc = SchemaDocument::parse(&schema).unwrap();
        let emitted = emit(&doc);
        assert_eq!(emitted, schema);
        // and the emitted form loads to the same shape again
        let again = SchemaDocument::parse(&emitted).unwrap();
        assert_eq!(again.len(), doc.len());
        assert_eq!(emit(&again), emitted);
    }

    #[test]
    fn round_trips_every_keyword() {
        round_trip(json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "http://example.com/person.json",
            "title": "Person",
            "description": "A person record",
            "type": "object",
            "properties": {
                "name": {"type": "string", "minLength": 1, "maxLength": 80, "pattern": "^\\S", "format": "idn-hostname"},
                "age": {"type": "integer", "minimum": 0, "exclusiveMaximum": 150, "multipleOf": 1},
                "score": {"type": "number", "maximum": 2.5, "exclusiveMinimum": -0.5},
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 0,
                    "maxItems": 10,
                    "uniqueItems": true,
                    "contains": {"type": "string", "pattern": "^core$"}
                },
                "pair": {"type": "array", "items": [{"type": "string"}, {"type": "null"}], "additionalItems": false},
                "home": {"$ref": "#/definitions/address"},
                "nick": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "flag": {"oneOf": [{"type": "boolean"}, {"allOf": [{"type": "null"}]}]}
            },
            "required": ["name", "age"],
            "additionalProperties": {"type": "string"},
            "patternProperties": {"^x-": {"type": "boolean"}},
            "propertyNames": {"pattern": "^[a-z-]+$"},
            "minProperties": 1,
            "maxProperties": 20,
            "dependencies": {
                "home": ["name"],
                "nick": {"type": "object", "required": ["name"]}
            },
            "definitions": {
                "address": {"type": "object", "properties": {"zip": {"type": "string"}}}
            },
            "$defs": {"unused": {"type": "null"}}
        }));
    }

    #[test]
    fn round_trips_opaque_and_empty_keywords() {
        round_trip(json!({
            "type": "object",
            "required": [],
            "properties": {},
            "x-ui": {"order": ["b", "a"]},
            "examples": [{"a": 1}],
            "minimum": 5
        }));
        round_trip(json!({
            "$ref": "#/definitions/a",
            "description": "kept",
            "type": "string",
            "definitions": {"a": {"type": "null"}}
        }));
    }

    #[test]
    fn emits_subtrees() {
        let doc = SchemaDocument::parse(&json!({
            "type": "array",
            "items": {"type": "number", "minimum": 1.5}
        }))
        .unwrap();
        let items = doc
            .lookup_pointer("", &crate::pointer::Pointer::parse("/items").unwrap())
            .unwrap();
        assert_eq!(emit_node(&doc, items), json!({"type": "number", "minimum": 1.5}));
    }
}
