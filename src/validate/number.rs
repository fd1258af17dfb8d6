use std::cmp::Ordering;

use serde_json::Value;

use super::type_mismatch;
use crate::pointer::Pointer;
use crate::report::{ValidationResult, ViolationKind};
use crate::schema::number::{compare, is_integral, is_multiple_of};
use crate::schema::{NumberConstraints, SchemaNode};

pub(super) fn check(node: &SchemaNode, c: &NumberConstraints, value: &Value, path: &Pointer) -> ValidationResult {
    let expected = if c.integer { "integer" } else { "number" };
    let Value::Number(n) = value else {
        return type_mismatch(node, expected, value, path);
    };
    if c.integer && !is_integral(n) {
        return type_mismatch(node, expected, value, path);
    }

    let mut out = ValidationResult::new();
    if let Some(limit) = &c.minimum {
        if compare(n, limit) == Some(Ordering::Less) {
            out.record(path, node.keyword("minimum"), ViolationKind::Minimum { value: n.clone(), limit: limit.clone() });
        }
    }
    if let Some(limit) = &c.exclusive_minimum {
        if compare(n, limit) != Some(Ordering::Greater) {
            out.record(
                path,
                node.keyword("exclusiveMinimum"),
                ViolationKind::ExclusiveMinimum { value: n.clone(), limit: limit.clone() },
            );
        }
    }
    if let Some(limit) = &c.maximum {
        if compare(n, limit) == Some(Ordering::Greater) {
            out.record(path, node.keyword("maximum"), ViolationKind::Maximum { value: n.clone(), limit: limit.clone() });
        }
    }
    if let Some(limit) = &c.exclusive_maximum {
        if compare(n, limit) != Some(Ordering::Less) {
            out.record(
                path,
                node.keyword("exclusiveMaximum"),
                ViolationKind::ExclusiveMaximum { value: n.clone(), limit: limit.clone() },
            );
        }
    }
    if let Some(divisor) = &c.multiple_of {
        if !is_multiple_of(n, divisor) {
            out.record(
                path,
                node.keyword("multipleOf"),
                ViolationKind::NotMultipleOf { value: n.clone(), divisor: divisor.clone() },
            );
        }
    }
    out
}
