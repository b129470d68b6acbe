//! Error types for lcrpd-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating the daemon config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read (missing, permission denied, etc.).
    #[error("failed to read config file [{path}]: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not a YAML mapping of the known keys.
    #[error("not able to load [{path}] as yaml file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// One or more required keys are absent or empty. Keys are listed in
    /// check order, so `keys[0]` is always the first missing key.
    #[error("no [{}] is configured, please correct config file [{}]", .keys.join(", "), .path.display())]
    MissingKeys {
        keys: Vec<&'static str>,
        path: PathBuf,
    },

    /// The configured changelog directory does not exist or is not a directory.
    #[error(
        "[{}] is not directory, please correct [{}] of config file [{}]",
        .dir.display(),
        .key,
        .path.display()
    )]
    NotADirectory {
        dir: PathBuf,
        key: &'static str,
        path: PathBuf,
    },
}
