use serde_json::Value;

use super::{type_mismatch, Walk};
use crate::pointer::Pointer;
use crate::report::{ValidationResult, ViolationKind};
use crate::schema::{Additional, Dependency, ObjectConstraints, SchemaNode};

pub(super) fn check(
    walk: &mut Walk<'_>,
    node: &SchemaNode,
    c: &ObjectConstraints,
    value: &Value,
    path: &Pointer,
) -> ValidationResult {
    let Value::Object(map) = value else {
        return type_mismatch(node, "object", value, path);
    };
    let mut out = ValidationResult::new();

    let count = map.len() as u64;
    if let Some(min) = c.min_properties {
        if count < min {
            out.record(path, node.keyword("minProperties"), ViolationKind::TooFewProperties { count, min });
        }
    }
    if let Some(max) = c.max_properties {
        if count > max {
            out.record(path, node.keyword("maxProperties"), ViolationKind::TooManyProperties { count, max });
        }
    }

    for property in c.required.iter().flatten() {
        if !map.contains_key(property) {
            out.record(
                path,
                node.keyword("required"),
                ViolationKind::MissingRequired {
                    property: property.clone(),
                },
            );
        }
    }

    for (property, dependency) in c.dependencies.iter().flatten() {
        if !map.contains_key(property) {
            continue;
        }
        match dependency {
            Dependency::Properties(names) => {
                for name in names.iter().filter(|name| !map.contains_key(*name)) {
                    out.record(
                        path,
                        node.keyword("dependencies").child(property.as_str()),
                        ViolationKind::MissingDependency {
                            property: property.clone(),
                            dependency: name.clone(),
                        },
                    );
                }
            }
            Dependency::Schema(id) => out.merge(walk.node(*id, value, path)),
        }
    }

    if let Some(pattern) = c.property_names.as_ref().and_then(|p| p.pattern.as_ref()) {
        for name in map.keys().filter(|name| !pattern.is_match(name)) {
            out.record(
                &path.child(name.as_str()),
                node.keyword("propertyNames").child("pattern"),
                ViolationKind::PropertyNameMismatch {
                    name: name.clone(),
                    pattern: pattern.as_str().to_string(),
                },
            );
        }
    }

    for (key, child) in map {
        let child_path = path.child(key.as_str());
        if let Some(id) = c.property(key) {
            out.merge(walk.node(id, child, &child_path));
            continue;
        }

        let mut matched = false;
        for pp in c.pattern_properties.iter().flatten() {
            if pp.regex.is_match(key) {
                matched = true;
                out.merge(walk.node(pp.node, child, &child_path));
            }
        }
        if matched {
            continue;
        }

        match c.additional {
            None | Some(Additional::Allowed(true)) => {}
            Some(Additional::Allowed(false)) => out.record(
                &child_path,
                node.keyword("additionalProperties"),
                ViolationKind::AdditionalProperty {
                    property: key.clone(),
                },
            ),
            Some(Additional::Schema(id)) => out.merge(walk.node(id, child, &child_path)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::report::ViolationKind;
    use crate::schema::SchemaDocument;

    fn paths(schema: serde_json::Value, value: serde_json::Value) -> Vec<(String, String)> {
        let doc = SchemaDocument::parse(&schema).unwrap();
        doc.validate(&value)
            .errors()
            .iter()
            .map(|v| (v.document_path.to_string(), v.schema_path.to_string()))
            .collect()
    }

    #[test]
    fn required_and_counts() {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "minProperties": 2
        });
        assert_eq!(
            paths(schema, json!({"a": 1})),
            [
                ("".into(), "/minProperties".into()),
                ("".into(), "/required".into())
            ]
        );
    }

    #[test]
    fn additional_properties_false() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "patternProperties": {"^x-": {"type": "string"}},
            "additionalProperties": false
        });
        assert!(paths(schema.clone(), json!({"name": "a", "x-note": "b"})).is_empty());
        assert_eq!(
            paths(schema, json!({"name": "a", "x-note": 1, "other": true})),
            [
                ("/x-note".into(), "/patternProperties/^x-/type".into()),
                ("/other".into(), "/additionalProperties".into())
            ]
        );
    }

    #[test]
    fn additional_properties_schema() {
        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": {"type": "boolean"}
        });
        assert!(paths(schema.clone(), json!({"id": 1, "flag": true})).is_empty());
        assert_eq!(
            paths(schema, json!({"id": 1, "flag": "yes"})),
            [("/flag".into(), "/additionalProperties/type".into())]
        );
    }

    #[test]
    fn dependencies_both_forms() {
        let schema = json!({
            "type": "object",
            "dependencies": {
                "card": ["billing"],
                "vip": {"type": "object", "required": ["level"]}
            }
        });
        assert!(paths(schema.clone(), json!({"other": 1})).is_empty());
        assert_eq!(
            paths(schema.clone(), json!({"card": "1234"})),
            [("".into(), "/dependencies/card".into())]
        );
        assert_eq!(
            paths(schema, json!({"vip": true})),
            [("".into(), "/dependencies/vip/required".into())]
        );
    }

    #[test]
    fn property_names_pattern() {
        let doc = SchemaDocument::parse(&json!({
            "type": "object",
            "propertyNames": {"pattern": "^[a-z]+$"}
        }))
        .unwrap();
        let result = doc.validate(&json!({"ok": 1, "Bad": 2}));
        assert_eq!(result.len(), 1);
        let violation = &result.errors()[0];
        assert_eq!(violation.document_path.to_string(), "/Bad");
        assert_eq!(violation.schema_path.to_string(), "/propertyNames/pattern");
        assert_eq!(
            violation.kind,
            ViolationKind::PropertyNameMismatch {
                name: "Bad".into(),
                pattern: "^[a-z]+$".into()
            }
        );
    }

    #[test]
    fn children_follow_document_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "string"}
            }
        });
        assert_eq!(
            paths(schema, json!({"b": 1, "a": 2})),
            [
                ("/b".into(), "/properties/b/type".into()),
                ("/a".into(), "/properties/a/type".into())
            ]
        );
    }
}
