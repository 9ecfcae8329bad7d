//! # vboxautoss
//!
//! One-shot snapshot and retention job for VirtualBox hosts. Meant to be
//! invoked periodically by an external scheduler (cron, systemd timers).
//!
//! ## Features
//! - Snapshot every registered VM, labelled with the current local time
//! - Prune the oldest snapshots of every VM down to a keep-count
//! - Console logging, plus an optional single email with the whole run log
//!
//! ## Usage
//! ```bash
//! vboxautoss --snapshot_vms --prune_snapshots 7 \
//!     --smtp_server smtp.example.com --smtp_user backup --email ops@example.com
//! ```

pub mod cli;
pub mod config;
pub mod run;

pub use config::Config;
pub use run::{run, RunPlan, RunSummary};
