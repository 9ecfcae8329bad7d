//! Mock hypervisor CLI for testing and development.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{HypervisorError, Result};
use crate::traits::HypervisorCli;

/// One invocation received by [`MockCli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListVms,
    ShowVmInfo(String),
    TakeSnapshot { vm_id: String, label: String },
    DeleteSnapshot { vm_id: String, snapshot_id: String },
}

impl MockCall {
    /// Whether the call changes hypervisor state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::TakeSnapshot { .. } | Self::DeleteSnapshot { .. })
    }
}

/// Mock hypervisor CLI.
///
/// Keeps VMs and their snapshots in memory and renders them in the same text
/// formats as `VBoxManage`, so the real parsers run against its output. Every
/// call is recorded; calls registered with [`MockCli::fail_on`] fail with a
/// command error instead of taking effect.
pub struct MockCli {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    vms: Vec<MockVm>,
    raw_vm_list: Option<String>,
    failures: Vec<MockCall>,
    calls: Vec<MockCall>,
    next_snapshot: u64,
}

struct MockVm {
    name: String,
    id: String,
    /// (name, id), oldest first
    snapshots: Vec<(String, String)>,
}

impl MockState {
    /// VBoxManage accepts either the name or the UUID of a VM.
    fn vm_mut(&mut self, vm: &str) -> Result<&mut MockVm> {
        self.vms
            .iter_mut()
            .find(|m| m.id == vm || m.name == vm)
            .ok_or_else(|| HypervisorError::CommandExecution {
                command: format!("VBoxManage ... {}", vm),
                message: format!("Could not find a registered machine named '{}'", vm),
            })
    }
}

impl MockCli {
    /// Create an empty mock with no VMs.
    pub fn new() -> Self {
        info!("Creating mock hypervisor CLI");
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Register a VM.
    pub fn with_vm(self, name: &str, id: &str) -> Self {
        self.lock().vms.push(MockVm {
            name: name.to_string(),
            id: id.to_string(),
            snapshots: Vec::new(),
        });
        self
    }

    /// Append a snapshot (newest so far) to a registered VM.
    pub fn with_snapshot(self, vm_id: &str, name: &str, id: &str) -> Self {
        {
            let mut state = self.lock();
            if let Some(vm) = state.vms.iter_mut().find(|m| m.id == vm_id) {
                vm.snapshots.push((name.to_string(), id.to_string()));
            }
        }
        self
    }

    /// Return `text` verbatim from `list vms` instead of rendering the VMs.
    pub fn with_raw_vm_list(self, text: &str) -> Self {
        self.lock().raw_vm_list = Some(text.to_string());
        self
    }

    /// Make `call` fail when it is received.
    pub fn fail_on(self, call: MockCall) -> Self {
        self.lock().failures.push(call);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Calls that would have changed hypervisor state.
    pub fn mutation_calls(&self) -> Vec<MockCall> {
        self.calls().into_iter().filter(MockCall::is_mutation).collect()
    }

    /// Current snapshot names of a VM, oldest first.
    pub fn snapshot_names(&self, vm_id: &str) -> Vec<String> {
        self.lock()
            .vms
            .iter()
            .find(|m| m.id == vm_id)
            .map(|vm| vm.snapshots.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `call`; fail it if it was registered with [`MockCli::fail_on`].
    fn record(&self, state: &mut MockState, call: MockCall) -> Result<()> {
        state.calls.push(call.clone());
        if state.failures.contains(&call) {
            debug!(call = ?call, "Mock call failing on request");
            return Err(HypervisorError::CommandExecution {
                command: format!("{:?}", call),
                message: "exit status: 1: mock failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HypervisorCli for MockCli {
    async fn list_vms_raw(&self) -> Result<String> {
        let mut state = self.lock();
        self.record(&mut state, MockCall::ListVms)?;

        if let Some(raw) = &state.raw_vm_list {
            return Ok(raw.clone());
        }

        Ok(state
            .vms
            .iter()
            .map(|vm| format!("\"{}\" {{{}}}\n", vm.name, vm.id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_snapshots_raw(&self, vm_id: &str) -> Result<String> {
        let mut state = self.lock();
        self.record(&mut state, MockCall::ShowVmInfo(vm_id.to_string()))?;
        let vm = state.vm_mut(vm_id)?;

        let mut out = format!(
            "Name:            {}\nUUID:            {}\nState:           powered off\n\n",
            vm.name, vm.id
        );
        if !vm.snapshots.is_empty() {
            out.push_str("Snapshots:\n\n");
            for (name, id) in &vm.snapshots {
                out.push_str(&format!("   Name: {} (UUID: {})\n", name, id));
            }
            out.push('\n');
        }
        out.push_str("Guest:\n\nConfigured memory balloon size: 0 MB\n");

        Ok(out)
    }

    #[instrument(skip(self))]
    async fn create_snapshot(&self, vm_id: &str, label: &str) -> Result<()> {
        let mut state = self.lock();
        self.record(
            &mut state,
            MockCall::TakeSnapshot {
                vm_id: vm_id.to_string(),
                label: label.to_string(),
            },
        )?;

        state.next_snapshot += 1;
        let id = format!("mock-snapshot-{}", state.next_snapshot);
        state.vm_mut(vm_id)?.snapshots.push((label.to_string(), id));

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_snapshot(&self, vm_id: &str, snapshot_id: &str) -> Result<()> {
        let mut state = self.lock();
        self.record(
            &mut state,
            MockCall::DeleteSnapshot {
                vm_id: vm_id.to_string(),
                snapshot_id: snapshot_id.to_string(),
            },
        )?;

        let vm = state.vm_mut(vm_id)?;
        let position = vm
            .snapshots
            .iter()
            .position(|(name, id)| id == snapshot_id || name == snapshot_id)
            .ok_or_else(|| HypervisorError::CommandExecution {
                command: format!("VBoxManage snapshot {} delete {}", vm_id, snapshot_id),
                message: format!("Could not find a snapshot named '{}'", snapshot_id),
            })?;
        vm.snapshots.remove(position);

        Ok(())
    }
}
