use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::{Additional, NodeId, Pattern};

/// Collection keywords are `Option`s so an explicitly empty keyword
/// (`"required": []`) survives a round trip.
#[derive(Debug, Clone, Default)]
pub struct ObjectConstraints {
    pub properties: Option<IndexMap<String, NodeId>>,
    pub required: Option<Vec<String>>,
    pub additional: Option<Additional>,
    pub pattern_properties: Option<Vec<PatternProperty>>,
    pub property_names: Option<PropertyNames>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    pub dependencies: Option<IndexMap<String, Dependency>>,
}

impl ObjectConstraints {
    pub fn property(&self, name: &str) -> Option<NodeId> {
        self.properties.as_ref().and_then(|p| p.get(name)).copied()
    }
}

#[derive(Debug, Clone)]
pub struct PatternProperty {
    pub regex: Regex,
    pub node: NodeId,
}

/// `propertyNames` restricted to a pattern; other keys are kept opaque.
#[derive(Debug, Clone, Default)]
pub struct PropertyNames {
    pub pattern: Option<Pattern>,
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    /// The listed properties become required.
    Properties(Vec<String>),
    /// The whole object must also satisfy this schema.
    Schema(NodeId),
}
