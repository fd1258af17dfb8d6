//! `allOf` / `anyOf` / `oneOf`.
//!
//! When no branch matches, the report carries a `NoBranchMatched` marker
//! followed by the violations of the closest branch: the one with the fewest
//! violations, ties going to the lowest index.
use serde_json::Value;

use super::Walk;
use crate::pointer::Pointer;
use crate::report::{ValidationResult, Violation, ViolationKind};
use crate::schema::{NodeId, SchemaNode};

pub(super) fn all_of(walk: &mut Walk<'_>, branches: &[NodeId], value: &Value, path: &Pointer) -> ValidationResult {
    let mut out = ValidationResult::new();
    for branch in branches {
        out.merge(walk.node(*branch, value, path));
    }
    out
}

pub(super) fn any_of(
    walk: &mut Walk<'_>,
    node: &SchemaNode,
    branches: &[NodeId],
    value: &Value,
    path: &Pointer,
) -> ValidationResult {
    let mut failures = Vec::with_capacity(branches.len());
    for branch in branches {
        let result = walk.node(*branch, value, path);
        if result.is_valid() {
            return result;
        }
        failures.push(result);
    }
    no_branch_matched(node, "anyOf", failures, path)
}

pub(super) fn one_of(
    walk: &mut Walk<'_>,
    node: &SchemaNode,
    branches: &[NodeId],
    value: &Value,
    path: &Pointer,
) -> ValidationResult {
    let mut matched = Vec::new();
    let mut failures = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let result = walk.node(*branch, value, path);
        if result.is_valid() {
            matched.push(index);
        } else {
            failures.push(result);
        }
    }
    match matched.len() {
        0 => no_branch_matched(node, "oneOf", failures, path),
        1 => ValidationResult::new(),
        _ => ValidationResult::single(Violation::new(
            path.clone(),
            node.keyword("oneOf"),
            ViolationKind::AmbiguousMatch { branches: matched },
        )),
    }
}

fn no_branch_matched(
    node: &SchemaNode,
    keyword: &'static str,
    failures: Vec<ValidationResult>,
    path: &Pointer,
) -> ValidationResult {
    let mut out = ValidationResult::single(Violation::new(
        path.clone(),
        node.keyword(keyword),
        ViolationKind::NoBranchMatched { keyword },
    ));
    // `min_by_key` keeps the first of equal minima
    if let Some(best) = failures.into_iter().min_by_key(ValidationResult::len) {
        out.merge(best);
    }
    out
}
