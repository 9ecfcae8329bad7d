//! Error types for the notification pipeline.

use thiserror::Error;

/// Errors raised while setting up or flushing notification sinks.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The mail sink could not be established from the supplied settings.
    #[error("Invalid notification configuration: {0}")]
    NotificationConfig(String),

    /// Buffered output could not be delivered.
    #[error("Failed to deliver notification: {0}")]
    Delivery(String),
}
