use super::{Additional, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema for every element.
    List(NodeId),
    /// Positional schemas; excess elements fall to `additionalItems`.
    Tuple(Vec<NodeId>),
}

#[derive(Debug, Clone, Default)]
pub struct ArrayConstraints {
    pub items: Option<Items>,
    pub additional_items: Option<Additional>,
    pub contains: Option<NodeId>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
}
