//! Immutable mirror snapshots of the live tree.
//!
//! Contract:
//! - One `MirrorNode` per live node, keyed by stable id, built in
//!   pre-order.
//! - Construction is two-pass: pass one clones content and records ordered
//!   child-id lists; pass two derives sibling links from those lists alone,
//!   so no link can leak in from an earlier cycle.
//! - A snapshot reflects only the live tree at the moment of its own
//!   construction and is immutable afterwards.
//! - Only element and text nodes are mirrored; any other kind is a
//!   precondition violation at the boundary.

use crate::identity::IdentityAllocator;
use crate::live::{LiveHandle, LiveNode};
use core_types::NodeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorContent {
    Element {
        tag: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub content: MirrorContent,
}

/// One fully materialized mirror of the live tree, with its id index.
#[derive(Debug)]
pub struct Snapshot {
    root: NodeId,
    nodes: HashMap<NodeId, MirrorNode>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// The live tree contained a node kind outside the mirror contract.
    UnsupportedKind { kind: &'static str },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::UnsupportedKind { kind } => {
                write!(f, "unsupported node kind: {kind}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl Snapshot {
    /// Mirrors the live tree rooted at `root` into a new snapshot.
    pub fn capture(
        root: &LiveHandle,
        ids: &mut IdentityAllocator,
    ) -> Result<Self, SnapshotError> {
        let mut nodes = HashMap::new();
        let root_id = mirror_subtree(root, None, ids, &mut nodes)?;
        link_siblings(&mut nodes);
        log::trace!(
            target: "mirror.snapshot",
            "captured snapshot: root {root_id}, {} nodes",
            nodes.len()
        );
        Ok(Self {
            root: root_id,
            nodes,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&MirrorNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Pass one: pre-order clone. The parent's entry exists before any of its
/// children are mirrored; child ids are appended as each child is created.
fn mirror_subtree(
    live: &LiveHandle,
    parent: Option<NodeId>,
    ids: &mut IdentityAllocator,
    nodes: &mut HashMap<NodeId, MirrorNode>,
) -> Result<NodeId, SnapshotError> {
    let id = ids.ensure(live);
    let borrowed = live.borrow();
    let content = match &*borrowed {
        LiveNode::Element {
            tag, attributes, ..
        } => MirrorContent::Element {
            tag: Arc::clone(tag),
            attributes: attributes.clone(),
        },
        LiveNode::Text { text } => MirrorContent::Text { text: text.clone() },
        other => {
            return Err(SnapshotError::UnsupportedKind {
                kind: other.kind_label(),
            });
        }
    };
    nodes.insert(
        id,
        MirrorNode {
            id,
            parent,
            previous_sibling: None,
            next_sibling: None,
            children: Vec::new(),
            content,
        },
    );
    for child in borrowed.children() {
        let child_id = mirror_subtree(child, Some(id), ids, nodes)?;
        if let Some(entry) = nodes.get_mut(&id) {
            entry.children.push(child_id);
        }
    }
    Ok(id)
}

/// Pass two: sibling links derived purely from the freshly built child
/// lists. Nodes keep `None` on both sides unless this pass says otherwise.
fn link_siblings(nodes: &mut HashMap<NodeId, MirrorNode>) {
    let child_lists: Vec<Vec<NodeId>> = nodes
        .values()
        .filter(|node| !node.children.is_empty())
        .map(|node| node.children.clone())
        .collect();
    for list in child_lists {
        for (index, id) in list.iter().enumerate() {
            let previous = index.checked_sub(1).map(|i| list[i]);
            let next = list.get(index + 1).copied();
            if let Some(node) = nodes.get_mut(id) {
                node.previous_sibling = previous;
                node.next_sibling = next;
            }
        }
    }
}
