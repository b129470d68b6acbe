//! Daemon configuration: YAML loading and validation.
//!
//! # File format
//!
//! ```yaml
//! fsname: lustre1
//! lcrp_dir: /var/lcrp/lustre1
//! changelog_user: cl1
//! ```
//!
//! Loading is split in two steps so that every failure keeps its kind:
//! [`load_config`] turns the file into a [`RawConfig`] (I/O and parse errors),
//! and [`validate`] turns a [`RawConfig`] into [`ValidatedParameters`]
//! (missing keys and a bad changelog directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const KEY_FSNAME: &str = "fsname";
pub const KEY_LCRP_DIR: &str = "lcrp_dir";
pub const KEY_CHANGELOG_USER: &str = "changelog_user";

// ---------------------------------------------------------------------------
// 1. Raw mapping
// ---------------------------------------------------------------------------

/// The config file as written by the operator. Every key may be absent here;
/// [`validate`] decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub fsname: Option<String>,
    pub lcrp_dir: Option<String>,
    pub changelog_user: Option<String>,
}

/// Read and parse the config file at `path`.
///
/// An empty (or whitespace-only) file yields an empty [`RawConfig`], so the
/// operator gets a missing-key diagnostic rather than a parser message.
pub fn load_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(RawConfig::default());
    }
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// 2. Validation
// ---------------------------------------------------------------------------

/// The three operational parameters of one cycle, all present and checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedParameters {
    fsname: String,
    lcrp_dir: PathBuf,
    changelog_user: String,
}

impl ValidatedParameters {
    pub fn fsname(&self) -> &str {
        &self.fsname
    }

    pub fn lcrp_dir(&self) -> &Path {
        &self.lcrp_dir
    }

    pub fn changelog_user(&self) -> &str {
        &self.changelog_user
    }
}

/// Validate `config` loaded from `config_path`.
///
/// Keys are checked in the order `fsname`, `lcrp_dir`, `changelog_user`; every
/// missing key is reported in one [`ConfigError::MissingKeys`]. The directory
/// check only runs once all three keys are present.
pub fn validate(
    config: &RawConfig,
    config_path: &Path,
) -> Result<ValidatedParameters, ConfigError> {
    let fsname = present(&config.fsname);
    let lcrp_dir = present(&config.lcrp_dir);
    let changelog_user = present(&config.changelog_user);

    let (Some(fsname), Some(lcrp_dir), Some(changelog_user)) = (fsname, lcrp_dir, changelog_user)
    else {
        let keys = [
            (KEY_FSNAME, fsname.is_none()),
            (KEY_LCRP_DIR, lcrp_dir.is_none()),
            (KEY_CHANGELOG_USER, changelog_user.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, missing)| missing.then_some(key))
        .collect();
        return Err(ConfigError::MissingKeys {
            keys,
            path: config_path.to_path_buf(),
        });
    };

    let lcrp_dir = PathBuf::from(lcrp_dir);
    if !lcrp_dir.is_dir() {
        return Err(ConfigError::NotADirectory {
            dir: lcrp_dir,
            key: KEY_LCRP_DIR,
            path: config_path.to_path_buf(),
        });
    }

    Ok(ValidatedParameters {
        fsname: fsname.to_owned(),
        lcrp_dir,
        changelog_user: changelog_user.to_owned(),
    })
}

/// A value counts as configured only when it has non-blank content.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_file_parses_as_empty_mapping() {
        let path = Path::new("/etc/lcrpd.conf");
        assert_eq!(parse_config("", path).unwrap(), RawConfig::default());
        assert_eq!(parse_config("  \n\n", path).unwrap(), RawConfig::default());
    }

    #[test]
    fn null_values_parse_as_absent() {
        let raw = parse_config("fsname: ~\nlcrp_dir:\n", Path::new("c.yaml")).unwrap();
        assert_eq!(raw, RawConfig::default());
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = parse_config("fsname: a\nmdt_device: /dev/sdb\n", Path::new("c.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("mdt_device"), "got: {err}");
    }

    #[test]
    fn present_rejects_blank_strings() {
        assert_eq!(present(&Some("lustre1".into())), Some("lustre1"));
        assert_eq!(present(&Some("   ".into())), None);
        assert_eq!(present(&None), None);
    }
}
