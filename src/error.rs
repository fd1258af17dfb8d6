//! Load-time and reference errors.
//!
//! - `SchemaLoadError`: structural defects found while building a `SchemaDocument` (fatal)
//! - `RefError`: a `$ref` that cannot be followed; reported as a violation mid-validation
use thiserror::Error;

use crate::pointer::Pointer;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaLoadError {
    #[error("malformed JSON near `{}`: {message}", .pointer.fragment())]
    Json { pointer: Pointer, message: String },

    #[error("duplicate key at `{}`", .pointer.fragment())]
    DuplicateKey { pointer: Pointer },

    #[error("schema at `{}` must be a JSON object", .pointer.fragment())]
    NotAnObject { pointer: Pointer },

    #[error("schema at `{}` has no `$ref`, `type` or combinator keyword", .pointer.fragment())]
    MissingKind { pointer: Pointer },

    #[error("schema at `{}` declares conflicting kinds: {}", .pointer.fragment(), .kinds.join(", "))]
    ConflictingKinds { pointer: Pointer, kinds: Vec<String> },

    #[error("unknown type `{name}` at `{}`", .pointer.fragment())]
    UnknownType { pointer: Pointer, name: String },

    #[error("`{keyword}` at `{}` must be {expected}", .pointer.fragment())]
    InvalidKeyword {
        pointer: Pointer,
        keyword: String,
        expected: &'static str,
    },

    #[error("`{lower}` is greater than `{upper}` at `{}`", .pointer.fragment())]
    InvertedBounds {
        pointer: Pointer,
        lower: &'static str,
        upper: &'static str,
    },

    #[error("`multipleOf` at `{}` must be greater than zero", .pointer.fragment())]
    NonPositiveMultipleOf { pointer: Pointer },

    #[error("invalid regex at `{}`: {message}", .pointer.fragment())]
    InvalidPattern { pointer: Pointer, message: String },

    #[error("unknown format `{format}` at `{}`", .pointer.fragment())]
    UnknownFormat { pointer: Pointer, format: String },

    #[error("`{keyword}` at `{}` must be a non-empty array of schemas", .pointer.fragment())]
    EmptyCombinator {
        pointer: Pointer,
        keyword: &'static str,
    },

    #[error("`required` at `{}` lists `{property}` more than once", .pointer.fragment())]
    DuplicateRequired { pointer: Pointer, property: String },

    #[error("`$id` `{id}` at `{}` is already declared", .pointer.fragment())]
    DuplicateId { pointer: Pointer, id: String },
}

impl SchemaLoadError {
    /// Location of the defect inside the raw schema.
    pub fn pointer(&self) -> &Pointer {
        match self {
            Self::Json { pointer, .. }
            | Self::DuplicateKey { pointer }
            | Self::NotAnObject { pointer }
            | Self::MissingKind { pointer }
            | Self::ConflictingKinds { pointer, .. }
            | Self::UnknownType { pointer, .. }
            | Self::InvalidKeyword { pointer, .. }
            | Self::InvertedBounds { pointer, .. }
            | Self::NonPositiveMultipleOf { pointer }
            | Self::InvalidPattern { pointer, .. }
            | Self::UnknownFormat { pointer, .. }
            | Self::EmptyCombinator { pointer, .. }
            | Self::DuplicateRequired { pointer, .. }
            | Self::DuplicateId { pointer, .. } => pointer,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("unresolvable reference `{reference}`")]
    NotFound { reference: String },

    #[error("cyclic reference: {}", .chain.join(" -> "))]
    Cyclic { chain: Vec<String> },

    #[error("reference `{reference}` exceeds the depth limit of {limit}")]
    TooDeep { reference: String, limit: usize },
}
