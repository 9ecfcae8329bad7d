//! Command-line argument parsing.
//!
//! Flag names are spelled with underscores (`--snapshot_vms`), matching the
//! crontab entries this tool is invoked from.

use clap::Parser;

/// vboxautoss - snapshot VirtualBox VMs and prune old snapshots
#[derive(Parser, Debug, Default)]
#[command(name = "vboxautoss")]
#[command(about = "Snapshot VirtualBox VMs and prune old snapshots, one pass per invocation")]
#[command(version)]
pub struct Args {
    /// Path to configuration file (optional, defaults used if not found)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Full path to VBoxManage utility [default: vboxmanage]
    #[arg(long = "vboxmanage_path")]
    pub vboxmanage_path: Option<String>,

    /// Take a snapshot of each machine in VirtualBox
    ///
    /// Can only enable snapshots; `snapshots.take: true` in the config file
    /// cannot be turned off from the command line.
    #[arg(long = "snapshot_vms")]
    pub snapshot_vms: bool,

    /// Prune oldest snapshots until n are left (0 disables pruning)
    #[arg(long = "prune_snapshots")]
    pub prune_snapshots: Option<u32>,

    // ========================================================================
    // Email notification
    // ========================================================================

    /// SMTP server to send logs via email
    #[arg(long = "smtp_server")]
    pub smtp_server: Option<String>,

    /// SMTP server port [default: 465]
    #[arg(long = "smtp_server_port")]
    pub smtp_server_port: Option<u16>,

    /// User on SMTP server
    #[arg(long = "smtp_user")]
    pub smtp_user: Option<String>,

    /// Password for user on SMTP server
    #[arg(long = "smtp_passwd", env = "VBOXAUTOSS_SMTP_PASSWD", hide_env_values = true)]
    pub smtp_passwd: Option<String>,

    /// Address to email the log to
    #[arg(long)]
    pub email: Option<String>,

    /// Use secure SSL/TLS login on SMTP server
    ///
    /// Can only enable TLS; `email.smtp_secure: true` in the config file
    /// cannot be turned off from the command line.
    #[arg(long = "smtp_secure")]
    pub smtp_secure: bool,
}
