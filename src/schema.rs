//! Typed schema model.
//!
//! A `SchemaDocument` owns every node of a parsed schema in a flat arena and
//! addresses them by `NodeId`. `$ref` edges are logical: a reference stores a
//! target (resource URI + fragment) that the resolver looks up in the
//! document's indexes, so the arena never holds ownership cycles.
//!
//! - Exactly one `NodeKind` per node; combinators are their own kinds.
//! - Unrecognized keywords are kept verbatim in `Meta::extra`.
//! - The document is immutable after `parse`; validation borrows it read-only.
pub mod array;
pub mod number;
pub mod object;
pub mod string;

use std::collections::HashMap;
use std::str::FromStr;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::{RefError, SchemaLoadError};
use crate::pointer::Pointer;
use crate::report::ValidationResult;
use crate::validate::Validator;

pub use array::{ArrayConstraints, Items};
pub use number::NumberConstraints;
pub use object::{Dependency, ObjectConstraints, PatternProperty, PropertyNames};
pub use string::{Format, Pattern, StringConstraints};

/// Index into the arena of the [`SchemaDocument`] that produced it. Ids are
/// not portable between documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Keywords shared by all node kinds.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub schema: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub definitions: Option<IndexMap<String, NodeId>>,
    pub defs: Option<IndexMap<String, NodeId>>,
    /// Unrecognized keywords, preserved but never interpreted.
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub meta: Meta,
    /// Location of this node inside the raw schema.
    pub pointer: Pointer,
    /// Base URI of the enclosing `$id` scope ("" when none was declared).
    pub base: String,
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Schema path of one of this node's keywords.
    pub fn keyword(&self, keyword: &str) -> Pointer {
        self.pointer.child(keyword)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Ref(RefNode),
    String(StringConstraints),
    Number(NumberConstraints),
    Object(ObjectConstraints),
    Array(ArrayConstraints),
    Boolean,
    Null,
    AnyOf(Vec<NodeId>),
    AllOf(Vec<NodeId>),
    OneOf(Vec<NodeId>),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Ref(_) => "$ref",
            NodeKind::String(_) => "string",
            NodeKind::Number(c) if c.integer => "integer",
            NodeKind::Number(_) => "number",
            NodeKind::Object(_) => "object",
            NodeKind::Array(_) => "array",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
            NodeKind::AnyOf(_) => "anyOf",
            NodeKind::AllOf(_) => "allOf",
            NodeKind::OneOf(_) => "oneOf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefNode {
    /// The `$ref` string as written.
    pub reference: String,
    pub target: RefTarget,
    /// Index of this reference's memo slot in the owning document.
    pub(crate) slot: usize,
}

/// Where a reference points, resolved against its base URI at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    pub resource: String,
    /// Decoded fragment: "" (resource root), a `/`-pointer, or an anchor name.
    pub fragment: String,
}

/// `additionalProperties` / `additionalItems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Additional {
    Allowed(bool),
    Schema(NodeId),
}

#[derive(Debug)]
pub struct SchemaDocument {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: NodeId,
    /// (resource URI, pointer relative to the resource) → node.
    pub(crate) pointers: HashMap<(String, String), NodeId>,
    /// (resource URI, anchor name) → node.
    pub(crate) anchors: HashMap<(String, String), NodeId>,
    pub(crate) ref_cache: Vec<OnceCell<Result<NodeId, RefError>>>,
    pub(crate) raw: Value,
}

impl SchemaDocument {
    /// Build a document from an already-parsed JSON value.
    pub fn parse(raw: &Value) -> Result<Self, SchemaLoadError> {
        crate::lower::lower_document(raw)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    ///
    /// If `id` was not handed out by this document.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Checked form of [`node`](Self::node) for ids of unknown origin.
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The schema value this document was built from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Ids of every `$ref` node, in arena order.
    pub fn refs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Ref(_)))
            .map(|(id, _)| id)
    }

    /// Node of a resource (`$id` scope) addressed by a pointer relative to it.
    pub fn lookup_pointer(&self, resource: &str, pointer: &Pointer) -> Option<NodeId> {
        self.pointers
            .get(&(resource.to_string(), pointer.to_string()))
            .copied()
    }

    pub fn lookup_anchor(&self, resource: &str, name: &str) -> Option<NodeId> {
        self.anchors
            .get(&(resource.to_string(), name.to_string()))
            .copied()
    }

    /// Validate with default options.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        Validator::new(self).validate(value)
    }
}

impl FromStr for SchemaDocument {
    type Err = SchemaLoadError;

    /// Parse schema text, rejecting duplicate object keys.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let raw = crate::path_de::from_str_strict(src)?;
        Self::parse(&raw)
    }
}
