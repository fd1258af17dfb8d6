//! The validation walk.
//!
//! A `Validator` borrows an immutable `SchemaDocument` and walks a JSON value
//! against it, collecting every violation instead of stopping at the first.
//! Per-kind checks live in the submodules; this module owns dispatch, `$ref`
//! traversal and the recursion guards.
mod array;
mod combinator;
mod number;
mod object;
mod string;

use rayon::prelude::*;
use serde_json::Value;

use crate::error::RefError;
use crate::pointer::Pointer;
use crate::report::{ValidationResult, Violation, ViolationKind};
use crate::resolve::resolve;
use crate::schema::{NodeId, NodeKind, RefNode, SchemaDocument, SchemaNode};

/// Validation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Most `$ref` traversals allowed on one path through the schema.
    pub max_depth: usize,
    /// Assert `format` keywords (annotation-only when off).
    pub validate_formats: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: 128,
            validate_formats: true,
        }
    }
}

impl Options {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_formats(mut self, validate_formats: bool) -> Self {
        self.validate_formats = validate_formats;
        self
    }
}

/// Validates documents against one schema. Cheap to construct and `Sync`.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    doc: &'a SchemaDocument,
    options: Options,
}

impl<'a> Validator<'a> {
    pub fn new(doc: &'a SchemaDocument) -> Self {
        Self::with_options(doc, Options::default())
    }

    pub fn with_options(doc: &'a SchemaDocument, options: Options) -> Self {
        Self { doc, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn validate(&self, value: &Value) -> ValidationResult {
        self.validate_node(self.doc.root(), value, &Pointer::root())
    }

    /// Validate `value`, found at `path` in its document, against one node.
    ///
    /// # Panics
    ///
    /// If `id` belongs to a different [`SchemaDocument`]; check foreign ids
    /// with [`SchemaDocument::get`] first.
    pub fn validate_node(&self, id: NodeId, value: &Value, path: &Pointer) -> ValidationResult {
        let mut walk = Walk {
            doc: self.doc,
            options: &self.options,
            active: Vec::new(),
        };
        walk.node(id, value, path)
    }

    /// Validate many documents in parallel; results keep input order.
    pub fn validate_all(&self, values: &[Value]) -> Vec<ValidationResult> {
        tracing::debug!(documents = values.len(), "validating batch");
        values.par_iter().map(|value| self.validate(value)).collect()
    }
}

/// State of a single validation: the `$ref`s currently being traversed.
struct Walk<'a> {
    doc: &'a SchemaDocument,
    options: &'a Options,
    active: Vec<(NodeId, Pointer)>,
}

impl<'a> Walk<'a> {
    fn node(&mut self, id: NodeId, value: &Value, path: &Pointer) -> ValidationResult {
        let doc = self.doc;
        let node = doc.node(id);
        match &node.kind {
            NodeKind::Ref(reference) => self.reference(id, node, reference, value, path),
            NodeKind::String(c) => string::check(self, node, c, value, path),
            NodeKind::Number(c) => number::check(node, c, value, path),
            NodeKind::Object(c) => object::check(self, node, c, value, path),
            NodeKind::Array(c) => array::check(self, node, c, value, path),
            NodeKind::Boolean => match value {
                Value::Bool(_) => ValidationResult::new(),
                other => type_mismatch(node, "boolean", other, path),
            },
            NodeKind::Null => match value {
                Value::Null => ValidationResult::new(),
                other => type_mismatch(node, "null", other, path),
            },
            NodeKind::AllOf(branches) => combinator::all_of(self, branches, value, path),
            NodeKind::AnyOf(branches) => combinator::any_of(self, node, branches, value, path),
            NodeKind::OneOf(branches) => combinator::one_of(self, node, branches, value, path),
        }
    }

    fn reference(
        &mut self,
        id: NodeId,
        node: &SchemaNode,
        reference: &RefNode,
        value: &Value,
        path: &Pointer,
    ) -> ValidationResult {
        let schema_path = node.keyword("$ref");

        // same reference at the same document location: the schema loops without consuming input
        if let Some(start) = self.active.iter().position(|(n, p)| *n == id && p == path) {
            let chain = self.active[start..]
                .iter()
                .map(|(n, _)| self.doc.node(*n).pointer.fragment())
                .chain(std::iter::once(node.pointer.fragment()))
                .collect();
            return ValidationResult::single(Violation::new(
                path.clone(),
                schema_path,
                RefError::Cyclic { chain }.into(),
            ));
        }
        if self.active.len() >= self.options.max_depth {
            return ValidationResult::single(Violation::new(
                path.clone(),
                schema_path,
                RefError::TooDeep {
                    reference: reference.reference.clone(),
                    limit: self.options.max_depth,
                }
                .into(),
            ));
        }

        match resolve(self.doc, id) {
            Ok(target) => {
                self.active.push((id, path.clone()));
                let result = self.node(target, value, path);
                self.active.pop();
                result
            }
            Err(error) => {
                tracing::warn!(reference = %reference.reference, %error, "reference failed during validation");
                ValidationResult::single(Violation::new(path.clone(), schema_path, error.into()))
            }
        }
    }
}

/// JSON type name of a value, distinguishing integral numbers.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_mismatch(node: &SchemaNode, expected: &'static str, value: &Value, path: &Pointer) -> ValidationResult {
    ValidationResult::single(Violation::new(
        path.clone(),
        node.keyword("type"),
        ViolationKind::TypeMismatch {
            expected,
            actual: type_name(value),
        },
    ))
}
