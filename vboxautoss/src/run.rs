//! Single-pass run orchestration.
//!
//! Phases run in a fixed order (snapshot, then prune) and the first failure
//! ends the run: nothing after it is attempted.

use chrono::Local;
use tracing::{debug, info, instrument};

use vboxautoss_common::Notifier;
use vboxautoss_hypervisor::error::Result;
use vboxautoss_hypervisor::{HypervisorCli, RetentionDecision, SnapshotManager};

/// Phases requested for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunPlan {
    /// Snapshot every VM
    pub snapshot_vms: bool,
    /// Newest snapshots to keep per VM; 0 skips pruning entirely
    pub prune_keep: u32,
}

impl RunPlan {
    pub fn is_empty(&self) -> bool {
        !self.snapshot_vms && self.prune_keep == 0
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub snapshots_taken: usize,
    pub snapshots_deleted: usize,
}

/// Execute `plan` against the hypervisor.
#[instrument(skip(cli, notifier))]
pub async fn run(plan: &RunPlan, cli: &dyn HypervisorCli, notifier: &Notifier) -> Result<RunSummary> {
    let manager = SnapshotManager::new(cli, notifier);
    let mut summary = RunSummary::default();

    if plan.is_empty() {
        debug!("Neither snapshotting nor pruning requested");
        return Ok(summary);
    }

    if plan.snapshot_vms {
        summary.snapshots_taken = take_snapshots(&manager).await?;
    }

    if plan.prune_keep > 0 {
        summary.snapshots_deleted = prune_snapshots(&manager, notifier, plan.prune_keep as usize).await?;
    }

    notifier.info(format!(
        "Run complete: took [{}] snapshots, deleted [{}] snapshots",
        summary.snapshots_taken, summary.snapshots_deleted
    ));
    Ok(summary)
}

/// Snapshot every VM, stopping at the first failure.
async fn take_snapshots(manager: &SnapshotManager<'_>) -> Result<usize> {
    let mut taken = 0;
    for vm in manager.list_vms().await? {
        manager.take_snapshot(&vm, Local::now()).await?;
        taken += 1;
    }
    info!(count = taken, "Snapshot phase finished");
    Ok(taken)
}

/// Delete all but the newest `keep` snapshots of every VM.
async fn prune_snapshots(manager: &SnapshotManager<'_>, notifier: &Notifier, keep: usize) -> Result<usize> {
    let mut deleted = 0;
    for vm in manager.list_vms().await? {
        let snapshots = manager.list_snapshots(&vm).await?;
        notifier.info(format!("VM [{}] has [{}] snapshots", vm.name, snapshots.len()));

        for snapshot in &snapshots {
            notifier.info(format!(
                "VM [{}] has snapshot named [{}] with UUID [{}]",
                vm.name, snapshot.name, snapshot.id
            ));
        }

        let decision = RetentionDecision::new(&snapshots, keep);
        if decision.is_empty() {
            continue;
        }

        notifier.info(format!(
            "Will delete [{}] snapshots for VM [{}]",
            decision.to_delete.len(),
            vm.name
        ));
        for snapshot in decision.to_delete {
            manager.delete_snapshot(&vm, &snapshot.id).await?;
            deleted += 1;
        }
    }
    info!(count = deleted, "Prune phase finished");
    Ok(deleted)
}
