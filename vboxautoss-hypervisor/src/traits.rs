//! Hypervisor command-line adapter trait.

use async_trait::async_trait;

use crate::error::Result;

/// Raw access to the hypervisor tool.
///
/// Each method maps to exactly one invocation of the tool. Implementations
/// return captured standard output unchanged; making sense of it is the
/// parser's job.
#[async_trait]
pub trait HypervisorCli: Send + Sync {
    /// List registered VMs (`list vms`).
    async fn list_vms_raw(&self) -> Result<String>;

    /// Detailed information for one VM, including its snapshots (`showvminfo`).
    async fn list_snapshots_raw(&self, vm_id: &str) -> Result<String>;

    /// Take a snapshot named `label`.
    async fn create_snapshot(&self, vm_id: &str, label: &str) -> Result<()>;

    /// Delete a snapshot by ID.
    async fn delete_snapshot(&self, vm_id: &str, snapshot_id: &str) -> Result<()>;
}
