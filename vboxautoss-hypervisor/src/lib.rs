//! # vboxautoss Hypervisor
//!
//! Snapshot lifecycle for VirtualBox machines driven through `VBoxManage`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           SnapshotManager               │
//! │  (list_vms, take_snapshot, delete, ...) │
//! └──────────┬──────────────────┬───────────┘
//!            │ raw text         │ records
//!            ▼                  ▼
//! ┌───────────────────┐  ┌───────────────────┐
//! │   HypervisorCli   │  │      parser       │
//! │ VBoxManage / Mock │  │ (VM + snapshots)  │
//! └───────────────────┘  └───────────────────┘
//! ```
//!
//! Retention is a pure function over a parsed [`SnapshotList`]; see
//! [`retention::select_prune_targets`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vboxautoss_common::Notifier;
//! use vboxautoss_hypervisor::{SnapshotManager, VBoxManage};
//!
//! let cli = VBoxManage::new("vboxmanage");
//! let notifier = Notifier::new();
//! let manager = SnapshotManager::new(&cli, &notifier);
//!
//! for vm in manager.list_vms().await? {
//!     manager.take_snapshot(&vm, chrono::Local::now()).await?;
//! }
//! ```

pub mod error;
pub mod lifecycle;
pub mod mock;
pub mod parser;
pub mod retention;
pub mod traits;
pub mod types;
pub mod vboxmanage;

pub use error::HypervisorError;
pub use lifecycle::SnapshotManager;
pub use mock::MockCli;
pub use retention::{select_prune_targets, RetentionDecision};
pub use traits::HypervisorCli;
pub use types::*;
pub use vboxmanage::VBoxManage;
