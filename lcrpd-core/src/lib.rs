//! lcrpd core library — daemon configuration loading and validation.
//!
//! - [`config`] — YAML load, [`RawConfig`], [`ValidatedParameters`]
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;

pub use config::{
    load_config, validate, RawConfig, ValidatedParameters, KEY_CHANGELOG_USER, KEY_FSNAME,
    KEY_LCRP_DIR,
};
pub use error::ConfigError;
