//! Flattening of snapshot subtrees into created-node descriptors.
//!
//! Descriptors come out in pre-order, so an ancestor is always emitted
//! before its descendants and every `previous_sibling` anchor refers to a
//! node the receiver already knows. A subtree is always serialized whole,
//! even when parts of it existed under another parent in an earlier
//! snapshot.

use crate::mutation::{AttrMap, NodeDescriptor};
use crate::snapshot::{MirrorContent, MirrorNode, Snapshot};
use core_types::NodeId;

/// Appends one descriptor per node under `id` (inclusive), pre-order.
pub fn serialize_subtree(snapshot: &Snapshot, id: NodeId, out: &mut Vec<NodeDescriptor>) {
    let Some(node) = snapshot.get(id) else {
        log::warn!(target: "mirror.serialize", "subtree root {id} missing from snapshot");
        return;
    };
    out.push(describe(node));
    for child in &node.children {
        serialize_subtree(snapshot, *child, out);
    }
}

fn describe(node: &MirrorNode) -> NodeDescriptor {
    match &node.content {
        MirrorContent::Element { tag, attributes } => NodeDescriptor {
            id: node.id,
            parent: node.parent,
            previous_sibling: node.previous_sibling,
            // Wire tag names follow host-DOM casing for element names.
            tag: Some(tag.to_ascii_uppercase()),
            attributes: if attributes.is_empty() {
                None
            } else {
                Some(AttrMap(
                    attributes
                        .iter()
                        .map(|(name, value)| (name.to_string(), value.clone()))
                        .collect(),
                ))
            },
            text: None,
        },
        MirrorContent::Text { text } => NodeDescriptor {
            id: node.id,
            parent: node.parent,
            previous_sibling: node.previous_sibling,
            tag: None,
            attributes: None,
            text: Some(text.clone()),
        },
    }
}
