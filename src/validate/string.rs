use serde_json::Value;

use super::{type_mismatch, Walk};
use crate::pointer::Pointer;
use crate::report::{ValidationResult, ViolationKind};
use crate::schema::{SchemaNode, StringConstraints};

pub(super) fn check(
    walk: &Walk<'_>,
    node: &SchemaNode,
    c: &StringConstraints,
    value: &Value,
    path: &Pointer,
) -> ValidationResult {
    let Value::String(s) = value else {
        return type_mismatch(node, "string", value, path);
    };
    let mut out = ValidationResult::new();

    // lengths count code points, not bytes
    let length = s.chars().count() as u64;
    if let Some(min) = c.min_length {
        if length < min {
            out.record(path, node.keyword("minLength"), ViolationKind::StringTooShort { length, min });
        }
    }
    if let Some(max) = c.max_length {
        if length > max {
            out.record(path, node.keyword("maxLength"), ViolationKind::StringTooLong { length, max });
        }
    }
    if let Some(pattern) = &c.pattern {
        if !pattern.is_match(s) {
            out.record(
                path,
                node.keyword("pattern"),
                ViolationKind::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                },
            );
        }
    }
    if let Some(format) = c.format {
        if walk.options.validate_formats && !format.matches(s) {
            out.record(
                path,
                node.keyword("format"),
                ViolationKind::FormatMismatch { format: format.name() },
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::report::ViolationKind;
    use crate::schema::SchemaDocument;
    use crate::validate::{Options, Validator};

    fn kinds(schema: serde_json::Value, value: serde_json::Value) -> Vec<ViolationKind> {
        let doc = SchemaDocument::parse(&schema).unwrap();
        doc.validate(&value).into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn length_counts_code_points() {
        let schema = json!({"type": "string", "minLength": 2, "maxLength": 3});
        assert!(kinds(schema.clone(), json!("日本")).is_empty());
        assert!(kinds(schema.clone(), json!("😀😀😀")).is_empty());
        assert_eq!(
            kinds(schema.clone(), json!("é")),
            [ViolationKind::StringTooShort { length: 1, min: 2 }]
        );
        assert_eq!(
            kinds(schema, json!("abcd")),
            [ViolationKind::StringTooLong { length: 4, max: 3 }]
        );
    }

    #[test]
    fn unanchored_pattern_must_cover_the_string() {
        let schema = json!({"type": "string", "pattern": "[0-9]+"});
        assert!(kinds(schema.clone(), json!("123")).is_empty());
        assert_eq!(
            kinds(schema, json!("abc123def")),
            [ViolationKind::PatternMismatch { pattern: "[0-9]+".into() }]
        );
    }

    #[test]
    fn anchored_pattern_keeps_its_anchors() {
        let full = json!({"type": "string", "pattern": "^[a-z]+$"});
        assert!(kinds(full.clone(), json!("abc")).is_empty());
        assert_eq!(kinds(full, json!("abc1")).len(), 1);
        // only the start is pinned
        let prefix = json!({"type": "string", "pattern": "^[0-9]+"});
        assert!(kinds(prefix.clone(), json!("123abc")).is_empty());
        assert_eq!(kinds(prefix, json!("abc123")).len(), 1);
    }

    #[test]
    fn formats_can_be_switched_off() {
        let doc = SchemaDocument::parse(&json!({"type": "string", "format": "date"})).unwrap();
        assert!(doc.validate(&json!("2024-02-29")).is_valid());
        let result = doc.validate(&json!("2023-02-29"));
        assert_eq!(result.errors()[0].schema_path.to_string(), "/format");

        let lenient = Validator::with_options(&doc, Options::default().with_formats(false));
        assert!(lenient.validate(&json!("2023-02-29")).is_valid());
    }

    #[test]
    fn checks_accumulate() {
        let schema = json!({"type": "string", "minLength": 5, "pattern": "^x", "format": "ipv4"});
        assert_eq!(kinds(schema, json!("abc")).len(), 3);
    }
}
