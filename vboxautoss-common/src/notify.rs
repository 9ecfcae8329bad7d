//! Run-scoped event recording.
//!
//! A [`Notifier`] fans every event out to a list of [`LogSink`]s. The console
//! sink is always present; further sinks (mail buffering, in-memory capture)
//! are added by the caller. Sinks are flushed when the notifier is dropped, so
//! buffered output is delivered on every exit path of a run.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use tracing::{debug, error, info, trace, warn, Level};

use crate::error::NotifyError;
use crate::mail::{BufferingMailSink, MailConfig, SmtpMailer};

/// A single recorded event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{:>8}] --- {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level.as_str(),
            self.message
        )
    }
}

/// Destination for recorded events.
pub trait LogSink: Send + Sync {
    /// Accept one event.
    fn record(&self, entry: &LogEntry);

    /// Deliver anything buffered so far. Called once when the notifier is dropped.
    fn flush(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Streams events to the process-wide tracing subscriber as they happen.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn record(&self, entry: &LogEntry) {
        let message = entry.message.as_str();
        match entry.level {
            Level::ERROR => error!(target: "vboxautoss", "{}", message),
            Level::WARN => warn!(target: "vboxautoss", "{}", message),
            Level::INFO => info!(target: "vboxautoss", "{}", message),
            Level::DEBUG => debug!(target: "vboxautoss", "{}", message),
            _ => trace!(target: "vboxautoss", "{}", message),
        }
    }
}

/// Keeps every event in memory; clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages recorded at exactly `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, entry: &LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
    }
}

/// Logger handed to every component of a run.
pub struct Notifier {
    sinks: Vec<Box<dyn LogSink>>,
}

impl Notifier {
    /// Create a notifier with only the console sink active.
    pub fn new() -> Self {
        Self {
            sinks: vec![Box::new(ConsoleSink)],
        }
    }

    /// Add a sink, builder style.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.push(sink);
    }

    /// Establish the buffering mail sink.
    ///
    /// A failure is logged to the sinks already attached and returned; the
    /// notifier is left without a mail sink.
    pub fn attach_mail(&mut self, config: &MailConfig) -> Result<(), NotifyError> {
        match SmtpMailer::from_config(config) {
            Ok(mailer) => {
                self.add_sink(Box::new(BufferingMailSink::new(mailer)));
                debug!(server = %config.server, port = config.port, "Mail sink attached");
                Ok(())
            }
            Err(e) => {
                self.error(format!(
                    "Could not send logs to specified email address; please check configuration--error was [{}]",
                    e
                ));
                Err(e)
            }
        }
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                warn!(error = %e, "Failed to flush log sink");
            }
        }
    }
}
