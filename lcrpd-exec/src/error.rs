use std::time::Duration;

use thiserror::Error;

/// Failures while starting, supervising, or draining a command.
///
/// A command that runs and exits nonzero is not an error; its status is
/// reported through [`crate::ExecResult`].
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start [{program}]: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command [{command}] timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("failed to get hostname: {0}")]
    Hostname(#[source] std::io::Error),
}

pub(crate) fn io_err(context: impl Into<String>, source: std::io::Error) -> ExecError {
    ExecError::Io {
        context: context.into(),
        source,
    }
}
