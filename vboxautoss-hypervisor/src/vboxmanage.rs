//! `VBoxManage` subprocess adapter.
//!
//! Runs the configured binary with an argv vector (no shell involved) and
//! hands back standard output. There is no timeout: a hung tool hangs the run.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::error::{HypervisorError, Result};
use crate::traits::HypervisorCli;

/// Default binary name, resolved through `PATH`.
pub const DEFAULT_VBOXMANAGE_PATH: &str = "vboxmanage";

/// Drives VirtualBox through its `VBoxManage` command-line tool.
#[derive(Debug, Clone)]
pub struct VBoxManage {
    /// VBoxManage binary path
    path: String,
}

impl VBoxManage {
    /// Create an adapter for the binary at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Render the command line for logs and errors.
    fn command_line(&self, args: &[&str]) -> String {
        std::iter::once(self.path.as_str())
            .chain(args.iter().copied())
            .map(|part| format!("\"{}\"", part))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute VBoxManage and return its standard output.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let command = self.command_line(args);
        debug!(command = %command, "Executing VBoxManage command");

        let output = Command::new(&self.path)
            .args(args)
            .output()
            .await
            .map_err(|e| HypervisorError::CommandExecution {
                command: command.clone(),
                message: format!("failed to start: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(command = %command, status = %output.status, stderr = %stderr.trim(), "VBoxManage command failed");
            return Err(HypervisorError::CommandExecution {
                command,
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for VBoxManage {
    fn default() -> Self {
        Self::new(DEFAULT_VBOXMANAGE_PATH)
    }
}

#[async_trait]
impl HypervisorCli for VBoxManage {
    async fn list_vms_raw(&self) -> Result<String> {
        self.run(&["list", "vms"]).await
    }

    #[instrument(skip(self))]
    async fn list_snapshots_raw(&self, vm_id: &str) -> Result<String> {
        self.run(&["showvminfo", vm_id]).await
    }

    #[instrument(skip(self))]
    async fn create_snapshot(&self, vm_id: &str, label: &str) -> Result<()> {
        self.run(&["snapshot", vm_id, "take", label]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_snapshot(&self, vm_id: &str, snapshot_id: &str) -> Result<()> {
        self.run(&["snapshot", vm_id, "delete", snapshot_id]).await?;
        Ok(())
    }
}
