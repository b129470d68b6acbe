//! `lcrpd run` — the daemon loop or a single cycle.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use lcrpd_daemon::paths::{LCRPD_CONFIG, LCRPD_LOG_DIR};
use lcrpd_daemon::{start_blocking, DaemonSettings};

/// Arguments for `lcrpd run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Daemon config file.
    #[arg(long, default_value = LCRPD_CONFIG)]
    pub config: PathBuf,

    /// Directory for `lcrpd.log` and `lcrpd-err.log`.
    #[arg(long, default_value = LCRPD_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Run one cycle and exit with its status.
    #[arg(long)]
    pub once: bool,

    /// Seconds to wait between cycles.
    #[arg(long, default_value_t = 5, conflicts_with = "once")]
    pub interval: u64,

    /// Write log files as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<ExitCode> {
        let settings = DaemonSettings {
            config_path: self.config,
            log_dir: self.log_dir,
            interval: Duration::from_secs(self.interval),
            ..DaemonSettings::default()
        };
        let status =
            start_blocking(settings, self.once, self.log_json).context("daemon exited with error")?;
        Ok(ExitCode::from(exit_code(status)))
    }
}

/// Cycle status → process exit code: daemon failures (negative) become 1,
/// command statuses pass through within what an exit code can carry.
fn exit_code(status: i32) -> u8 {
    match status {
        0 => 0,
        s if s < 0 => 1,
        s => s.clamp(1, 255) as u8,
    }
}
