//! # vboxautoss Common
//!
//! Shared utilities for the vboxautoss crates.
//!
//! ## Logging
//!
//! Console output goes through `tracing`. Run-scoped events are recorded
//! through a [`Notifier`], which is constructed once per run and handed to
//! every component that needs to report something:
//!
//! ```rust
//! use vboxautoss_common::{init_logging, Notifier};
//!
//! init_logging("info").unwrap();
//!
//! let notifier = Notifier::new();
//! notifier.info("Taking snapshot for vm [web1] with name [2024/01/01 00:00:00]");
//! ```
//!
//! When mail settings are supplied, [`Notifier::attach_mail`] adds a sink that
//! buffers every event and sends them as a single email when the notifier is
//! dropped.

pub mod error;
pub mod logging;
pub mod mail;
pub mod notify;

pub use error::NotifyError;
pub use logging::init_logging;
pub use mail::{BufferingMailSink, MailConfig, MailTransport, SmtpMailer};
pub use notify::{ConsoleSink, LogEntry, LogSink, MemorySink, Notifier};
