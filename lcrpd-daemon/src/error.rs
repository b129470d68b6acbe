use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use lcrpd_core::ConfigError;
use lcrpd_exec::ExecError;

/// Error surface for daemon bootstrap and the cycle loop.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cycle task join failure: {0}")]
    Join(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}

/// The cycle stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadConfig,
    Validate,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::LoadConfig => "LOAD_CONFIG",
            Stage::Validate => "VALIDATE",
            Stage::Execute => "EXECUTE",
        })
    }
}

/// Why a cycle ended without a command exit status.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to load config: {0}")]
    Load(#[source] ConfigError),

    #[error("invalid config: {0}")]
    Validate(#[source] ConfigError),

    #[error("failed to run changelog reader: {0}")]
    Execute(#[source] ExecError),

    /// The cycle body unwound instead of returning.
    #[error("cycle panicked: {0}")]
    Panicked(String),
}

impl CycleError {
    pub fn stage(&self) -> Stage {
        match self {
            CycleError::Load(_) => Stage::LoadConfig,
            CycleError::Validate(_) => Stage::Validate,
            CycleError::Execute(_) | CycleError::Panicked(_) => Stage::Execute,
        }
    }
}

/// `err` followed by every `source()` beneath it, joined with `: `, skipping
/// sources whose text the parent message already embeds.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_match_cycle_states() {
        assert_eq!(Stage::LoadConfig.to_string(), "LOAD_CONFIG");
        assert_eq!(Stage::Validate.to_string(), "VALIDATE");
        assert_eq!(Stage::Execute.to_string(), "EXECUTE");
    }

    #[test]
    fn panicked_cycle_is_reported_as_execute() {
        let err = CycleError::Panicked("host vanished".to_owned());
        assert_eq!(err.stage(), Stage::Execute);
        assert_eq!(error_chain(&err), "cycle panicked: host vanished");
    }

    #[test]
    fn error_chain_includes_io_cause_once() {
        let err = CycleError::Execute(ExecError::Hostname(std::io::Error::new(
            std::io::ErrorKind::Other,
            "uts namespace unavailable",
        )));
        let chain = error_chain(&err);
        assert_eq!(chain.matches("uts namespace unavailable").count(), 1, "{chain}");
        assert!(chain.starts_with("failed to run changelog reader"));
        assert_eq!(err.stage(), Stage::Execute);
    }
}
