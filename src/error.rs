//! Error types for pooled tool execution.

use std::process::ExitStatus;

/// Errors that can occur while executing the pooled tool.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The tool process failed to start.
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the tool process failed.
    #[error("failed to wait for {tool}: {source}")]
    Wait {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited with a failure status.
    ///
    /// `output` holds whatever was captured before exit, for diagnostics.
    #[error("{tool} exited with {status}")]
    ExitFailure {
        tool: String,
        status: ExitStatus,
        output: Vec<u8>,
    },

    /// A captured stream was unavailable on the spawned child.
    #[error("{stream} pipe unavailable on spawned child")]
    Pipe { stream: &'static str },

    /// The home pool has been shut down.
    #[error("home pool is shut down")]
    PoolClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pooled execution operations.
pub type Result<T> = std::result::Result<T, ExecError>;
