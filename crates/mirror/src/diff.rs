//! Identity-keyed structural diff between two consecutive snapshots.
//!
//! Contract:
//! - Nodes correspond iff they carry the same id; never by position or
//!   content.
//! - Child membership is a plain test on the ordered id lists, so a pure
//!   sibling reorder with unchanged membership is invisible.
//! - A node under a new parent is removed from the old parent's child set
//!   and re-serialized whole under the new one; there is no move
//!   detection.
//! - Removed ids name subtree roots only; descendants are implied.
//! - Output ordering is deterministic (pre-order over the current
//!   snapshot).

use crate::mutation::{AttrDelta, AttributeChange, MutationSet, TextChange};
use crate::serialize::serialize_subtree;
use crate::snapshot::{MirrorContent, Snapshot};
use core_types::NodeId;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
pub enum DiffError {
    /// The two snapshots do not share a root identity; they are not a
    /// consecutive pair from one lineage.
    LineageViolation {
        current: NodeId,
        previous: NodeId,
    },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffError::LineageViolation { current, previous } => write!(
                f,
                "snapshot lineage violation: current root {current}, previous root {previous}"
            ),
        }
    }
}

impl std::error::Error for DiffError {}

#[derive(Debug)]
pub struct DiffOutcome {
    pub mutations: MutationSet,
    /// Bookkeeping inconsistencies skipped over during recursion; always
    /// zero for snapshots produced by this crate.
    pub anomalies: u64,
}

/// Diffs `current` against `previous`, keyed by node identity.
pub fn diff_snapshots(
    current: &Snapshot,
    previous: &Snapshot,
) -> Result<DiffOutcome, DiffError> {
    if current.root() != previous.root() {
        return Err(DiffError::LineageViolation {
            current: current.root(),
            previous: previous.root(),
        });
    }
    let mut run = DiffRun {
        current,
        previous,
        out: MutationSet::default(),
        anomalies: 0,
    };
    run.diff_pair(current.root());
    Ok(DiffOutcome {
        mutations: run.out,
        anomalies: run.anomalies,
    })
}

struct DiffRun<'a> {
    current: &'a Snapshot,
    previous: &'a Snapshot,
    out: MutationSet,
    anomalies: u64,
}

impl DiffRun<'_> {
    /// Compares the pair of nodes carrying `id` in both snapshots.
    fn diff_pair(&mut self, id: NodeId) {
        let (Some(current), Some(previous)) = (self.current.get(id), self.previous.get(id))
        else {
            // Should be unreachable given the membership bookkeeping in
            // the caller; skipping keeps the diff total rather than wrong.
            self.anomalies += 1;
            log::warn!(target: "mirror.diff", "node {id} missing from an index; skipping subtree");
            return;
        };
        match (&current.content, &previous.content) {
            (
                MirrorContent::Text { text: current_text },
                MirrorContent::Text { text: previous_text },
            ) => {
                if current_text != previous_text {
                    self.out.texts.push(TextChange {
                        id,
                        text: current_text.clone(),
                    });
                }
            }
            (
                MirrorContent::Element {
                    attributes: current_attrs,
                    ..
                },
                MirrorContent::Element {
                    attributes: previous_attrs,
                    ..
                },
            ) => {
                let added: Vec<NodeId> = current
                    .children
                    .iter()
                    .filter(|child| !previous.children.contains(child))
                    .copied()
                    .collect();
                for child in &previous.children {
                    if !current.children.contains(child) {
                        self.out.removed.push(*child);
                    }
                }
                for child in &added {
                    serialize_subtree(self.current, *child, &mut self.out.created);
                }

                let delta = attribute_delta(current_attrs, previous_attrs);
                if !delta.is_empty() {
                    self.out.attributes.push(AttributeChange { id, changes: delta });
                }

                for child in &current.children {
                    if added.contains(child) {
                        continue;
                    }
                    self.diff_pair(*child);
                }
            }
            _ => {
                // A kind flip under one id breaks the identity contract.
                self.anomalies += 1;
                log::warn!(target: "mirror.diff", "node {id} changed kind between snapshots; skipping subtree");
            }
        }
    }
}

/// Per-name attribute delta: changed or added values first (current
/// order), then removals flagged with `None` (previous order).
fn attribute_delta(
    current: &[(Arc<str>, String)],
    previous: &[(Arc<str>, String)],
) -> AttrDelta {
    let mut delta = Vec::new();
    for (name, value) in current {
        let matches_previous = lookup(previous, name).is_some_and(|prev| prev == value);
        if !matches_previous {
            delta.push((name.to_string(), Some(value.clone())));
        }
    }
    for (name, _) in previous {
        if lookup(current, name).is_none() {
            delta.push((name.to_string(), None));
        }
    }
    AttrDelta(delta)
}

fn lookup<'a>(attributes: &'a [(Arc<str>, String)], name: &str) -> Option<&'a String> {
    attributes
        .iter()
        .find(|(existing, _)| existing.as_ref() == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::{DiffError, diff_snapshots};
    use crate::identity::IdentityAllocator;
    use crate::live::{LiveHandle, LiveNode};
    use crate::snapshot::Snapshot;

    fn capture(root: &LiveHandle, ids: &mut IdentityAllocator) -> Snapshot {
        Snapshot::capture(root, ids).expect("capture failed")
    }

    #[test]
    fn unchanged_tree_diffs_to_empty() {
        let root = LiveNode::element("div");
        let child = LiveNode::element("p");
        let text = LiveNode::text("hi");
        child.borrow_mut().append_child(&text);
        root.borrow_mut().append_child(&child);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        let current = capture(&root, &mut ids);
        let outcome = diff_snapshots(&current, &previous).expect("diff failed");
        assert!(outcome.mutations.is_empty());
        assert_eq!(outcome.anomalies, 0);
    }

    #[test]
    fn text_change_is_reported_once_for_the_leaf() {
        let root = LiveNode::element("div");
        let child = LiveNode::element("p");
        let text = LiveNode::text("hi");
        child.borrow_mut().append_child(&text);
        root.borrow_mut().append_child(&child);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        text.borrow_mut().set_text("bye");
        let current = capture(&root, &mut ids);

        let outcome = diff_snapshots(&current, &previous).expect("diff failed");
        let mutations = outcome.mutations;
        assert_eq!(mutations.texts.len(), 1);
        assert_eq!(mutations.texts[0].id, ids.peek(&text).expect("missing id"));
        assert_eq!(mutations.texts[0].text, "bye");
        assert!(mutations.removed.is_empty());
        assert!(mutations.attributes.is_empty());
        assert!(mutations.created.is_empty());
    }

    #[test]
    fn removed_subtree_lists_only_its_root() {
        let root = LiveNode::element("div");
        let branch = LiveNode::element("ul");
        let leaf = LiveNode::element("li");
        let text = LiveNode::text("x");
        leaf.borrow_mut().append_child(&text);
        branch.borrow_mut().append_child(&leaf);
        root.borrow_mut().append_child(&branch);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        let branch_id = ids.peek(&branch).expect("missing id");
        root.borrow_mut().remove_child(&branch);
        let current = capture(&root, &mut ids);

        let mutations = diff_snapshots(&current, &previous)
            .expect("diff failed")
            .mutations;
        assert_eq!(mutations.removed, vec![branch_id]);
        assert!(mutations.created.is_empty());
    }

    #[test]
    fn added_subtree_is_serialized_whole() {
        let root = LiveNode::element("div");
        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);

        let branch = LiveNode::element("ul");
        let leaf = LiveNode::element("li");
        let text = LiveNode::text("x");
        leaf.borrow_mut().append_child(&text);
        branch.borrow_mut().append_child(&leaf);
        root.borrow_mut().append_child(&branch);
        let current = capture(&root, &mut ids);

        let mutations = diff_snapshots(&current, &previous)
            .expect("diff failed")
            .mutations;
        assert_eq!(mutations.created.len(), 3);
        assert_eq!(mutations.created[0].id, ids.peek(&branch).expect("missing id"));
        assert_eq!(mutations.created[1].id, ids.peek(&leaf).expect("missing id"));
        assert_eq!(mutations.created[2].id, ids.peek(&text).expect("missing id"));
        assert!(mutations.removed.is_empty());
    }

    #[test]
    fn attribute_add_change_and_removal_combine_in_one_record() {
        let root = LiveNode::element("a");
        root.borrow_mut().set_attribute("href", "a");
        root.borrow_mut().set_attribute("title", "t");

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        root.borrow_mut().set_attribute("href", "b");
        root.borrow_mut().remove_attribute("title");
        root.borrow_mut().set_attribute("data-x", "1");
        let current = capture(&root, &mut ids);

        let mutations = diff_snapshots(&current, &previous)
            .expect("diff failed")
            .mutations;
        assert_eq!(mutations.attributes.len(), 1);
        let delta = &mutations.attributes[0].changes.0;
        assert_eq!(
            delta,
            &vec![
                ("href".to_string(), Some("b".to_string())),
                ("data-x".to_string(), Some("1".to_string())),
                ("title".to_string(), None),
            ]
        );
    }

    #[test]
    fn unchanged_attributes_yield_no_record_at_all() {
        let root = LiveNode::element("div");
        root.borrow_mut().set_attribute("class", "keep");
        let child = LiveNode::element("span");
        root.borrow_mut().append_child(&child);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        let current = capture(&root, &mut ids);
        let mutations = diff_snapshots(&current, &previous)
            .expect("diff failed")
            .mutations;
        assert!(mutations.attributes.is_empty());
    }

    #[test]
    fn reparented_node_is_removed_and_recreated() {
        let root = LiveNode::element("div");
        let left = LiveNode::element("ul");
        let right = LiveNode::element("ol");
        let item = LiveNode::element("li");
        left.borrow_mut().append_child(&item);
        root.borrow_mut().append_child(&left);
        root.borrow_mut().append_child(&right);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        let item_id = ids.peek(&item).expect("missing id");
        left.borrow_mut().remove_child(&item);
        right.borrow_mut().append_child(&item);
        let current = capture(&root, &mut ids);

        let mutations = diff_snapshots(&current, &previous)
            .expect("diff failed")
            .mutations;
        assert_eq!(mutations.removed, vec![item_id]);
        assert_eq!(mutations.created.len(), 1);
        assert_eq!(mutations.created[0].id, item_id);
        assert_eq!(
            mutations.created[0].parent,
            Some(ids.peek(&right).expect("missing id"))
        );
    }

    #[test]
    fn pure_sibling_reorder_is_invisible() {
        // Known limitation of membership-only child diffing.
        let root = LiveNode::element("div");
        let first = LiveNode::element("p");
        let second = LiveNode::element("span");
        root.borrow_mut().append_child(&first);
        root.borrow_mut().append_child(&second);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        root.borrow_mut().remove_child(&second);
        root.borrow_mut().insert_child(0, &second);
        let current = capture(&root, &mut ids);

        let outcome = diff_snapshots(&current, &previous).expect("diff failed");
        assert!(outcome.mutations.is_empty());
    }

    #[test]
    fn root_identity_never_appears_in_removed() {
        let root = LiveNode::element("div");
        let child = LiveNode::element("p");
        root.borrow_mut().append_child(&child);

        let mut ids = IdentityAllocator::new();
        let previous = capture(&root, &mut ids);
        root.borrow_mut().remove_child(&child);
        let current = capture(&root, &mut ids);

        let mutations = diff_snapshots(&current, &previous)
            .expect("diff failed")
            .mutations;
        assert!(!mutations.removed.contains(&current.root()));
    }

    #[test]
    fn unrelated_roots_are_a_lineage_violation() {
        let mut ids = IdentityAllocator::new();
        let first_root = LiveNode::element("div");
        let first = capture(&first_root, &mut ids);
        let second_root = LiveNode::element("div");
        let second = capture(&second_root, &mut ids);

        let err = diff_snapshots(&second, &first).expect_err("expected failure");
        assert_eq!(
            err,
            DiffError::LineageViolation {
                current: second.root(),
                previous: first.root(),
            }
        );
    }
}
