//! Records parsed from hypervisor tool output.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};

use crate::error::{HypervisorError, Result};

/// Format used for the names of snapshots this tool takes.
pub const SNAPSHOT_LABEL_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Largest backward step tolerated between neighbouring labels.
///
/// Labels are local wall-clock time with no offset, so the hour repeated when
/// daylight saving ends (or a small clock correction) makes them run
/// backwards even though the listing is oldest first.
pub const LABEL_ROLLBACK_TOLERANCE_SECS: i64 = 60 * 60;

/// Render the snapshot label for a point in time.
pub fn snapshot_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(SNAPSHOT_LABEL_FORMAT).to_string()
}

/// A virtual machine known to the hypervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachine {
    /// Display name
    pub name: String,
    /// Hypervisor-assigned identifier, without surrounding braces
    pub id: String,
}

/// A snapshot of one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub id: String,
    /// ID of the VM the listing was taken from
    pub vm_id: String,
}

/// Snapshots of a single VM in the order the hypervisor listed them.
///
/// The order is assumed to be chronological, oldest first. Retention relies
/// on it: the leading entries are the ones pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotList {
    snapshots: Vec<Snapshot>,
}

impl SnapshotList {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self { snapshots }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Check the oldest-first assumption where it can be checked.
    ///
    /// Only possible when every name is a label in [`SNAPSHOT_LABEL_FORMAT`];
    /// any other naming leaves the listing order trusted as-is. A label may
    /// precede its predecessor by up to [`LABEL_ROLLBACK_TOLERANCE_SECS`].
    pub fn verify_chronological(&self, vm_name: &str) -> Result<()> {
        let tolerance = Duration::seconds(LABEL_ROLLBACK_TOLERANCE_SECS);
        let taken: Option<Vec<NaiveDateTime>> = self
            .snapshots
            .iter()
            .map(|s| NaiveDateTime::parse_from_str(&s.name, SNAPSHOT_LABEL_FORMAT).ok())
            .collect();

        let Some(taken) = taken else {
            return Ok(());
        };

        for (i, pair) in taken.windows(2).enumerate() {
            if pair[1] + tolerance < pair[0] {
                return Err(HypervisorError::SnapshotOrder {
                    vm: vm_name.to_string(),
                    newer: self.snapshots[i].name.clone(),
                    older: self.snapshots[i + 1].name.clone(),
                });
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a SnapshotList {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
