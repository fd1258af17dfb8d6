//! Validation outcomes.
//!
//! Violations are values, never errors: a walk collects every one it finds, in
//! pre-order (node-level checks first, then children in document order).
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Number;
use thiserror::Error;

use crate::error::RefError;
use crate::pointer::Pointer;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViolationKind {
    #[error("expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("string has {length} characters, fewer than the minimum of {min}")]
    StringTooShort { length: u64, min: u64 },

    #[error("string has {length} characters, more than the maximum of {max}")]
    StringTooLong { length: u64, max: u64 },

    #[error("string does not match pattern `{pattern}`")]
    PatternMismatch { pattern: String },

    #[error("string is not a valid `{format}`")]
    FormatMismatch { format: &'static str },

    #[error("{value} is less than the minimum of {limit}")]
    Minimum { value: Number, limit: Number },

    #[error("{value} must be greater than {limit}")]
    ExclusiveMinimum { value: Number, limit: Number },

    #[error("{value} is greater than the maximum of {limit}")]
    Maximum { value: Number, limit: Number },

    #[error("{value} must be less than {limit}")]
    ExclusiveMaximum { value: Number, limit: Number },

    #[error("{value} is not a multiple of {divisor}")]
    NotMultipleOf { value: Number, divisor: Number },

    #[error("missing required property `{property}`")]
    MissingRequired { property: String },

    #[error("property `{property}` is not allowed")]
    AdditionalProperty { property: String },

    #[error("object has {count} properties, fewer than the minimum of {min}")]
    TooFewProperties { count: u64, min: u64 },

    #[error("object has {count} properties, more than the maximum of {max}")]
    TooManyProperties { count: u64, max: u64 },

    #[error("property name `{name}` does not match pattern `{pattern}`")]
    PropertyNameMismatch { name: String, pattern: String },

    #[error("property `{dependency}` is required when `{property}` is present")]
    MissingDependency { property: String, dependency: String },

    #[error("array has {count} items, fewer than the minimum of {min}")]
    TooFewItems { count: u64, min: u64 },

    #[error("array has {count} items, more than the maximum of {max}")]
    TooManyItems { count: u64, max: u64 },

    #[error("array has {count} items but no more than {max} are allowed")]
    AdditionalItems { count: u64, max: u64 },

    #[error("no item matches the `contains` schema")]
    ContainsNoMatch,

    #[error("item {duplicate} duplicates item {first}")]
    DuplicateItems { first: usize, duplicate: usize },

    #[error("value matches no branch of `{keyword}`")]
    NoBranchMatched { keyword: &'static str },

    #[error("value matches more than one `oneOf` branch: {}", fmt_indices(.branches))]
    AmbiguousMatch { branches: Vec<usize> },

    #[error(transparent)]
    Reference(#[from] RefError),
}

fn fmt_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Where in the validated document the failure was found.
    pub document_path: Pointer,
    /// The failing keyword inside the raw schema.
    pub schema_path: Pointer,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(document_path: Pointer, schema_path: Pointer, kind: ViolationKind) -> Self {
        Self {
            document_path,
            schema_path,
            kind,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (schema {})",
            self.document_path.fragment(),
            self.kind,
            self.schema_path.fragment()
        )
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Violation", 3)?;
        s.serialize_field("documentPath", &self.document_path)?;
        s.serialize_field("schemaPath", &self.schema_path)?;
        s.serialize_field("message", &self.message())?;
        s.end()
    }
}

/// Every violation found by one validation, in walk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<Violation>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(violation: Violation) -> Self {
        Self {
            errors: vec![violation],
        }
    }

    pub fn push(&mut self, violation: Violation) {
        self.errors.push(violation);
    }

    pub fn record(&mut self, document_path: &Pointer, schema_path: Pointer, kind: ViolationKind) {
        self.push(Violation::new(document_path.clone(), schema_path, kind));
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Violation> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl IntoIterator for ValidationResult {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationResult", 2)?;
        s.serialize_field("valid", &self.is_valid())?;
        s.serialize_field("errors", &self.errors)?;
        s.end()
    }
}
