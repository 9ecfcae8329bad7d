//! Logging initialization using tracing.

use anyhow::Result;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the console subscriber for a vboxautoss run.
///
/// Every notifier event and every adapter debug line is written to stdout as
/// one line with timestamp, level and source location. The event target is
/// left out since all notifier output shares the `vboxautoss` target. Under
/// cron, stdout is what ends up in the job's mail or log.
///
/// `level` comes from `--log-level`; `RUST_LOG` overrides it when set. Fails
/// if a global subscriber is already installed.
///
/// ```
/// vboxautoss_common::init_logging("info").unwrap();
/// ```
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
        );

    subscriber.try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_rejected() {
        init_logging("debug").unwrap();
        assert!(init_logging("info").is_err());
    }
}
