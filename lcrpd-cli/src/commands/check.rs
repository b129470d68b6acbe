//! `lcrpd check` — validate the config without running anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use lcrpd_core::{load_config, validate, ValidatedParameters};
use lcrpd_daemon::changelog::{changelog_command, LCRP_CMD_CHANGELOG};
use lcrpd_daemon::command_path::resolve_command_path;
use lcrpd_daemon::paths::LCRPD_CONFIG;
use lcrpd_daemon::DaemonSettings;

/// Arguments for `lcrpd check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Daemon config file.
    #[arg(long, default_value = LCRPD_CONFIG)]
    pub config: PathBuf,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    config: &'a PathBuf,
    #[serde(flatten)]
    parameters: &'a ValidatedParameters,
    command: String,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let raw = load_config(&self.config).context("config could not be loaded")?;
        let parameters = validate(&raw, &self.config).context("config is invalid")?;

        let invocation = DaemonSettings::default().invocation;
        let program = resolve_command_path(&invocation, LCRP_CMD_CHANGELOG);
        let command = changelog_command(&program, &parameters).to_string();

        if self.json {
            let report = CheckReport {
                config: &self.config,
                parameters: &parameters,
                command,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render check JSON")?
            );
        } else {
            println!("config ok: {}", self.config.display());
            println!("command: {command}");
        }
        Ok(())
    }
}
