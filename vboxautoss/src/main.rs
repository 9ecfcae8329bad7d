use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use vboxautoss::cli::Args;
use vboxautoss::config::{Config, DEFAULT_CONFIG_PATH};
use vboxautoss_common::Notifier;
use vboxautoss_hypervisor::VBoxManage;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    vboxautoss_common::init_logging(&args.log_level)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting vboxautoss");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => match Config::load(config_path) {
            Ok(cfg) => {
                info!(config_path = %config_path, "Configuration loaded");
                cfg.with_cli_overrides(&args)
            }
            Err(e) => {
                error!(error = %e, path = %config_path, "Failed to load configuration");
                return Err(e);
            }
        },
        None => match Config::load_or_default(DEFAULT_CONFIG_PATH, &args) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = %e, path = %DEFAULT_CONFIG_PATH, "Failed to load configuration");
                return Err(e);
            }
        },
    };
    config.validate()?;

    // The notifier lives until main returns, so the mail sink is flushed on
    // both the success and the error path.
    let mut notifier = Notifier::new();
    if let Some(mail) = config.mail_config() {
        notifier.attach_mail(&mail)?;
    }

    let cli = VBoxManage::new(config.hypervisor.vboxmanage_path.clone());
    let plan = config.plan();
    info!(
        vboxmanage = %cli.path(),
        snapshot_vms = plan.snapshot_vms,
        prune_keep = plan.prune_keep,
        "Run configured"
    );

    vboxautoss::run(&plan, &cli, &notifier).await?;

    Ok(())
}
