//! `$ref` resolution.
//!
//! A reference is followed through the document's pointer and anchor indexes,
//! chasing ref-to-ref chains until a non-ref node is reached. The outcome is
//! memoized per reference slot, so concurrent validations share one lookup.
use crate::error::RefError;
use crate::pointer::Pointer;
use crate::schema::{NodeId, NodeKind, RefNode, SchemaDocument};

/// Longest ref-to-ref chain followed before giving up.
pub const MAX_REF_CHAIN: usize = 32;

/// Resolve the `$ref` node `id` to the first non-ref node it leads to.
///
/// Calling this on a non-ref node returns the node itself.
pub fn resolve(doc: &SchemaDocument, id: NodeId) -> Result<NodeId, RefError> {
    let NodeKind::Ref(node) = &doc.node(id).kind else {
        return Ok(id);
    };
    doc.ref_cache[node.slot]
        .get_or_init(|| follow(doc, id))
        .clone()
}

/// Every reference that fails to resolve, in arena order.
pub fn resolve_all(doc: &SchemaDocument) -> Vec<(NodeId, RefError)> {
    doc.refs()
        .filter_map(|id| resolve(doc, id).err().map(|error| (id, error)))
        .collect()
}

/// The node a single reference names, without chasing further refs.
pub fn lookup(doc: &SchemaDocument, node: &RefNode) -> Option<NodeId> {
    let target = &node.target;
    if target.fragment.is_empty() || target.fragment.starts_with('/') {
        let pointer = Pointer::parse(&target.fragment).ok()?;
        doc.lookup_pointer(&target.resource, &pointer)
    } else {
        doc.lookup_anchor(&target.resource, &target.fragment)
    }
}

fn follow(doc: &SchemaDocument, start: NodeId) -> Result<NodeId, RefError> {
    tracing::trace!(pointer = %doc.node(start).pointer, "resolving reference");
    let mut chain = vec![start];
    let mut current = start;
    loop {
        let NodeKind::Ref(node) = &doc.node(current).kind else {
            return Ok(current);
        };
        if chain.len() > MAX_REF_CHAIN {
            return Err(RefError::TooDeep {
                reference: node.reference.clone(),
                limit: MAX_REF_CHAIN,
            });
        }
        let next = lookup(doc, node).ok_or_else(|| RefError::NotFound {
            reference: node.reference.clone(),
        })?;
        if chain.contains(&next) {
            chain.push(next);
            tracing::debug!(reference = %node.reference, "cyclic reference chain");
            return Err(RefError::Cyclic {
                chain: chain
                    .iter()
                    .map(|id| doc.node(*id).pointer.fragment())
                    .collect(),
            });
        }
        chain.push(next);
        current = next;
    }
}
