//! Snapshot lifecycle: list, take and delete snapshots per VM.
//!
//! Every failure is reported to the notifier at error level and then returned
//! unchanged, so the caller can abort the run.

use chrono::{DateTime, Local};
use tracing::instrument;
use vboxautoss_common::Notifier;

use crate::error::Result;
use crate::parser::{parse_snapshot_list, parse_vm_list};
use crate::traits::HypervisorCli;
use crate::types::{snapshot_label, SnapshotList, VirtualMachine};

/// Composes the CLI adapter and the parsers into per-VM operations.
pub struct SnapshotManager<'a> {
    cli: &'a dyn HypervisorCli,
    notifier: &'a Notifier,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(cli: &'a dyn HypervisorCli, notifier: &'a Notifier) -> Self {
        Self { cli, notifier }
    }

    /// All registered VMs, in listing order.
    #[instrument(skip(self))]
    pub async fn list_vms(&self) -> Result<Vec<VirtualMachine>> {
        let result = match self.cli.list_vms_raw().await {
            Ok(raw) => parse_vm_list(&raw),
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            self.notifier.error(format!(
                "Couldn't get list of virtual machines from VirtualBox--error message was [{}]",
                e
            ));
            e
        })
    }

    /// Snapshots of `vm`, oldest first.
    #[instrument(skip(self, vm), fields(vm_id = %vm.id, vm_name = %vm.name))]
    pub async fn list_snapshots(&self, vm: &VirtualMachine) -> Result<SnapshotList> {
        let result = match self.cli.list_snapshots_raw(&vm.id).await {
            Ok(raw) => {
                let snapshots = parse_snapshot_list(&vm.id, &raw);
                snapshots.verify_chronological(&vm.name).map(|_| snapshots)
            }
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            self.notifier.error(format!(
                "Couldn't get list of snapshots for machine [{}]--error was [{}]",
                vm.name, e
            ));
            e
        })
    }

    /// Take a snapshot of `vm` labelled with `at`. Returns the label.
    #[instrument(skip(self, vm), fields(vm_id = %vm.id, vm_name = %vm.name))]
    pub async fn take_snapshot(&self, vm: &VirtualMachine, at: DateTime<Local>) -> Result<String> {
        let label = snapshot_label(&at);
        self.notifier.info(format!(
            "Taking snapshot for vm [{}] with name [{}]",
            vm.name, label
        ));

        self.cli.create_snapshot(&vm.id, &label).await.map_err(|e| {
            self.notifier.error(format!(
                "Couldn't take snapshot [{}] for machine [{}]--error was [{}]",
                label, vm.name, e
            ));
            e
        })?;

        Ok(label)
    }

    /// Delete one snapshot of `vm`.
    #[instrument(skip(self, vm), fields(vm_id = %vm.id, vm_name = %vm.name))]
    pub async fn delete_snapshot(&self, vm: &VirtualMachine, snapshot_id: &str) -> Result<()> {
        self.notifier.warn(format!(
            "Deleting snapshot [{}] for VM [{}]",
            snapshot_id, vm.name
        ));

        self.cli.delete_snapshot(&vm.id, snapshot_id).await.map_err(|e| {
            self.notifier.error(format!(
                "Couldn't delete snapshot [{}] for machine [{}]--error was [{}]",
                snapshot_id, vm.name, e
            ));
            e
        })
    }
}
