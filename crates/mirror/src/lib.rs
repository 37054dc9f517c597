//! Identity-preserving tree mirroring and structural diffing.
//!
//! The engine observes a live, host-owned element/text tree, mirrors it
//! into immutable snapshots, and computes identity-keyed mutation sets
//! between consecutive snapshots — removed subtrees, attribute deltas,
//! text replacements, and created subtrees, in a compact wire shape.
//!
//! Contract:
//! - Correspondence between snapshots is strictly by stable node id;
//!   never positional, never content-based.
//! - The live tree is read, not written; identity lives in a weak
//!   side-table inside the allocator.
//! - Exactly two snapshots are retained at any time (current, previous).
//! - The diff is a pure, deterministic function of its two snapshot
//!   inputs; there is nothing to retry.
//! - Pure sibling reorders with unchanged membership are invisible by
//!   design; there is no move detection or edit-distance search.

pub mod diff;
pub mod dump;
pub mod identity;
pub mod live;
pub mod mutation;
pub mod serialize;
pub mod snapshot;
pub mod tracker;

pub use crate::diff::{DiffError, DiffOutcome, diff_snapshots};
pub use crate::identity::IdentityAllocator;
pub use crate::live::{LiveHandle, LiveNode};
pub use crate::mutation::{
    AttrDelta, AttrMap, AttributeChange, MutationSet, NodeDescriptor, TextChange,
};
pub use crate::serialize::serialize_subtree;
pub use crate::snapshot::{MirrorContent, MirrorNode, Snapshot, SnapshotError};
pub use crate::tracker::{CaptureError, MirrorTracker, TrackerCounters};
pub use core_types::NodeId;
