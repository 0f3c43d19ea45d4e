//! Gate error types.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running a lifecycle operation.
///
/// The `Display` text of these errors is what clients see in the `output`
/// field of a failed operation.
#[derive(Debug, Error)]
pub enum GateError {
    /// Another operation holds the slot.
    #[error("Already running: {0}")]
    AlreadyRunning(String),

    /// The orchestration tool did not finish in time and was killed.
    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The orchestration tool could not be started or waited on.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
