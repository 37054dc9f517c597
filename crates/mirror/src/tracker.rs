//! Cycle driver: "snapshot now and diff against previous".
//!
//! The tracker owns the identity allocator and the previous-snapshot slot.
//! Exactly two snapshots exist at the peak of a cycle; the superseded one
//! is dropped when the new one is installed. Cycles are strictly
//! sequential — a capture runs to completion before the next may begin.
//!
//! First-cycle baseline: a full bootstrap dump. The very first capture
//! returns the entire tree as created descriptors (root included, with a
//! null parent) so a consumer can perform its initial render from the
//! same contract it applies increments through.
//!
//! A failed capture does not advance the window: the previous snapshot
//! stays installed and the cycle counter does not move.

use crate::diff::{DiffError, diff_snapshots};
use crate::identity::IdentityAllocator;
use crate::live::LiveHandle;
use crate::mutation::MutationSet;
use crate::serialize::serialize_subtree;
use crate::snapshot::{Snapshot, SnapshotError};
use core_types::CycleCount;
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum CaptureError {
    Snapshot(SnapshotError),
    Diff(DiffError),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Snapshot(err) => write!(f, "capture failed: {err}"),
            CaptureError::Diff(err) => write!(f, "capture failed: {err}"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Snapshot(err) => Some(err),
            CaptureError::Diff(err) => Some(err),
        }
    }
}

impl From<SnapshotError> for CaptureError {
    fn from(err: SnapshotError) -> Self {
        CaptureError::Snapshot(err)
    }
}

impl From<DiffError> for CaptureError {
    fn from(err: DiffError) -> Self {
        CaptureError::Diff(err)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerCounters {
    pub cycles: CycleCount,
    /// Diff bookkeeping inconsistencies skipped over (index misses,
    /// kind flips). Nonzero values indicate a bug upstream.
    pub anomalies: u64,
    /// Identity side-table entries reclaimed after their node died.
    pub pruned_identities: u64,
    /// Recycled live-node addresses caught holding a dead identity entry.
    pub stale_identities: u64,
}

pub struct MirrorTracker {
    ids: IdentityAllocator,
    previous: Option<Snapshot>,
    counters: TrackerCounters,
}

impl MirrorTracker {
    pub fn new() -> Self {
        Self {
            ids: IdentityAllocator::new(),
            previous: None,
            counters: TrackerCounters::default(),
        }
    }

    /// Runs one capture cycle against the live tree rooted at `root`.
    pub fn capture(&mut self, root: &LiveHandle) -> Result<MutationSet, CaptureError> {
        let snapshot = Snapshot::capture(root, &mut self.ids)?;
        let mutations = match self.previous.as_ref() {
            None => bootstrap(&snapshot),
            Some(previous) => {
                let outcome = diff_snapshots(&snapshot, previous)?;
                self.counters.anomalies += outcome.anomalies;
                outcome.mutations
            }
        };
        self.counters.cycles += 1;
        self.counters.pruned_identities += self.ids.prune() as u64;
        self.counters.stale_identities = self.ids.stale_evictions();
        log::debug!(
            target: "mirror.cycle",
            "cycle {}: {} nodes, {} removed, {} attribute, {} text, {} created",
            self.counters.cycles,
            snapshot.len(),
            mutations.removed.len(),
            mutations.attributes.len(),
            mutations.texts.len(),
            mutations.created.len(),
        );
        self.previous = Some(snapshot);
        Ok(mutations)
    }

    pub fn counters(&self) -> TrackerCounters {
        self.counters
    }

    /// Identity side-table entries currently alive.
    pub fn tracked_identities(&self) -> usize {
        self.ids.len()
    }
}

impl Default for MirrorTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// First-cycle result: the whole tree as created descriptors, pre-order.
fn bootstrap(snapshot: &Snapshot) -> MutationSet {
    let mut mutations = MutationSet::default();
    serialize_subtree(snapshot, snapshot.root(), &mut mutations.created);
    mutations
}
