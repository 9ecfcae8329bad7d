//! Error types for the hypervisor layer.

use thiserror::Error;

/// Errors that can occur while driving the hypervisor tool.
#[derive(Error, Debug)]
pub enum HypervisorError {
    /// The tool could not be started or exited with a failure status.
    #[error("Command [{command}] failed: {message}")]
    CommandExecution {
        /// Rendered command line
        command: String,
        /// Underlying process error, exit status or stderr
        message: String,
    },

    /// Tool output did not match the expected grammar.
    #[error("Failed to parse hypervisor output: {0}")]
    Parse(String),

    /// A snapshot listing is not oldest-first.
    #[error("Snapshots of VM [{vm}] are not listed oldest first: [{newer}] precedes [{older}]")]
    SnapshotOrder {
        vm: String,
        newer: String,
        older: String,
    },
}

/// Result type alias for hypervisor operations.
pub type Result<T> = std::result::Result<T, HypervisorError>;
