use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LCRPD_CONFIG: &str = "/etc/lcrpd.conf";
pub const LCRPD_LOG_DIR: &str = "/var/log/lcrpd";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

pub const LCRPD_LOG: &str = "lcrpd.log";
pub const LCRPD_ERR_LOG: &str = "lcrpd-err.log";

/// Everything a cycle needs from the process environment, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    pub config_path: PathBuf,
    pub log_dir: PathBuf,
    /// How this program was invoked (`argv[0]`); helper commands are looked
    /// up next to it.
    pub invocation: PathBuf,
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(LCRPD_CONFIG),
            log_dir: PathBuf::from(LCRPD_LOG_DIR),
            invocation: std::env::args_os().next().map(PathBuf::from).unwrap_or_default(),
            interval: DEFAULT_INTERVAL,
        }
    }
}

pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LCRPD_LOG)
}

pub fn err_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LCRPD_ERR_LOG)
}
