//! Configuration management.
//!
//! Settings come from an optional YAML file; command-line flags override it.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use vboxautoss_common::mail::{MailConfig, DEFAULT_SMTP_PORT};
use vboxautoss_hypervisor::vboxmanage::DEFAULT_VBOXMANAGE_PATH;

use crate::cli::Args;
use crate::run::RunPlan;

/// Location read when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vboxautoss/vboxautoss.yaml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hypervisor tool configuration
    pub hypervisor: HypervisorConfig,
    /// Which phases run
    pub snapshots: SnapshotConfig,
    /// Email delivery of the run log
    pub email: EmailConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// Only a missing file falls back; a file that exists but cannot be read
    /// or parsed is an error. CLI arguments are applied either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P, args: &Args) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default_with_cli(args));
        }
        Ok(Self::load(path)?.with_cli_overrides(args))
    }

    /// Defaults with CLI arguments applied.
    pub fn default_with_cli(args: &Args) -> Self {
        Self::default().with_cli_overrides(args)
    }

    /// Apply CLI argument overrides to the configuration.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(ref path) = args.vboxmanage_path {
            self.hypervisor.vboxmanage_path = path.clone();
        }

        if args.snapshot_vms {
            self.snapshots.take = true;
        }

        if let Some(keep) = args.prune_snapshots {
            self.snapshots.keep = keep;
        }

        if let Some(ref server) = args.smtp_server {
            self.email.smtp_server = Some(server.clone());
        }

        if let Some(port) = args.smtp_server_port {
            self.email.smtp_server_port = port;
        }

        if let Some(ref user) = args.smtp_user {
            self.email.smtp_user = Some(user.clone());
        }

        if let Some(ref passwd) = args.smtp_passwd {
            self.email.smtp_passwd = Some(passwd.clone());
        }

        if let Some(ref email) = args.email {
            self.email.recipient = Some(email.clone());
        }

        if args.smtp_secure {
            self.email.smtp_secure = true;
        }

        self
    }

    /// Reject settings that cannot work regardless of the environment.
    pub fn validate(&self) -> Result<()> {
        if self.hypervisor.vboxmanage_path.trim().is_empty() {
            bail!("vboxmanage_path must not be empty");
        }
        if self.email.smtp_server.is_some() && self.email.smtp_server_port == 0 {
            bail!("smtp_server_port must be non-zero");
        }
        Ok(())
    }

    /// Phases requested for this run.
    pub fn plan(&self) -> RunPlan {
        RunPlan {
            snapshot_vms: self.snapshots.take,
            prune_keep: self.snapshots.keep,
        }
    }

    /// Mail sink settings, present only when an SMTP server is configured.
    pub fn mail_config(&self) -> Option<MailConfig> {
        let server = self.email.smtp_server.as_ref()?;
        Some(MailConfig {
            server: server.clone(),
            port: self.email.smtp_server_port,
            user: self.email.smtp_user.clone(),
            password: self.email.smtp_passwd.clone(),
            recipient: self.email.recipient.clone(),
            secure: self.email.smtp_secure,
        })
    }
}

/// Hypervisor tool configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HypervisorConfig {
    /// Path to the VBoxManage binary
    pub vboxmanage_path: String,
}

impl Default for HypervisorConfig {
    fn default() -> Self {
        Self {
            vboxmanage_path: DEFAULT_VBOXMANAGE_PATH.to_string(),
        }
    }
}

/// Snapshot phases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Take a snapshot of every VM
    pub take: bool,
    /// Keep this many newest snapshots per VM; 0 disables pruning
    pub keep: u32,
}

/// Email delivery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_server: Option<String>,
    pub smtp_server_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_passwd: Option<String>,
    pub recipient: Option<String>,
    pub smtp_secure: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: None,
            smtp_server_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_passwd: None,
            recipient: None,
            smtp_secure: false,
        }
    }
}
