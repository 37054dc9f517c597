use serde::Serialize;
use std::fmt;

pub type RawNodeId = u32;

/// Stable identity of one live node.
///
/// Allocated once per live node by the identity allocator and never reused or
/// reassigned while that node is alive. Two mirror nodes from different
/// snapshots refer to the same live node iff their ids are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub RawNodeId);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic counter of completed capture cycles, used for log correlation.
pub type CycleCount = u64;
