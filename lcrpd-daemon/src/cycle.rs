//! One daemon cycle: `LOAD_CONFIG → VALIDATE → EXECUTE`.
//!
//! [`Cycle::try_run`] keeps the failing stage in [`CycleError`];
//! [`Cycle::run`] is the boundary the loop calls, where every failure is
//! logged and folded into [`CYCLE_FAILURE`]. That includes a panic raised by
//! the host or connector, which is caught here rather than left to unwind
//! into the loop.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use lcrpd_core::{load_config, validate};
use lcrpd_exec::{local_hostname, ExecError, RemoteHost, SshHost};

use crate::changelog;
use crate::error::{error_chain, CycleError};
use crate::paths::DaemonSettings;

/// Status reported for any failure inside the daemon itself, as opposed to
/// a nonzero exit of the changelog reader.
pub const CYCLE_FAILURE: i32 = -1;

/// This machine as an execution target.
pub fn connect_local() -> Result<SshHost, ExecError> {
    local_hostname()
        .map(SshHost::local)
        .map_err(ExecError::Hostname)
}

pub struct Cycle<'a> {
    settings: &'a DaemonSettings,
}

impl<'a> Cycle<'a> {
    pub fn new(settings: &'a DaemonSettings) -> Self {
        Self { settings }
    }

    /// Run against the local host.
    pub fn run(&self) -> i32 {
        self.run_with(connect_local)
    }

    /// The changelog reader's exit status, or [`CYCLE_FAILURE`] after logging
    /// why the cycle could not get that far.
    pub fn run_with<H, F>(&self, connect: F) -> i32
    where
        H: RemoteHost,
        F: FnOnce() -> Result<H, ExecError>,
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_run_with(connect)))
            .unwrap_or_else(|payload| Err(CycleError::Panicked(panic_message(payload.as_ref()))));
        match outcome {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(
                    stage = %err.stage(),
                    config = %self.settings.config_path.display(),
                    "{}",
                    error_chain(&err)
                );
                CYCLE_FAILURE
            }
        }
    }

    pub fn try_run(&self) -> Result<i32, CycleError> {
        self.try_run_with(connect_local)
    }

    /// `connect` is only called once the config is known to be good.
    pub fn try_run_with<H, F>(&self, connect: F) -> Result<i32, CycleError>
    where
        H: RemoteHost,
        F: FnOnce() -> Result<H, ExecError>,
    {
        let config_path = &self.settings.config_path;
        let config = load_config(config_path).map_err(CycleError::Load)?;
        let params = validate(&config, config_path).map_err(CycleError::Validate)?;

        let host = connect().map_err(CycleError::Execute)?;
        changelog::invoke(&host, &params, &self.settings.invocation).map_err(CycleError::Execute)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
