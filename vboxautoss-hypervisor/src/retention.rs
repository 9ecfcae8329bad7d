//! Retention policy: keep the newest `keep` snapshots of each VM.

use crate::types::{Snapshot, SnapshotList};

/// Snapshots to delete so that at most `keep` remain.
///
/// `snapshots` must be oldest first; the leading `len - keep` entries are
/// returned in their original order. Nothing is returned when `keep` covers
/// the whole list.
pub fn select_prune_targets(snapshots: &[Snapshot], keep: usize) -> &[Snapshot] {
    let excess = snapshots.len().saturating_sub(keep);
    &snapshots[..excess]
}

/// Outcome of applying the retention policy to one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionDecision<'a> {
    pub to_delete: &'a [Snapshot],
}

impl<'a> RetentionDecision<'a> {
    pub fn new(snapshots: &'a SnapshotList, keep: usize) -> Self {
        Self {
            to_delete: select_prune_targets(snapshots.as_slice(), keep),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty()
    }
}
