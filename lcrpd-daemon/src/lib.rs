//! lcrpd daemon: one changelog-harvest cycle, and the loop that repeats it.

pub mod changelog;
pub mod command_path;
mod cycle;
mod error;
pub mod log_rotation;
pub mod paths;
mod runtime;

pub use cycle::{connect_local, Cycle, CYCLE_FAILURE};
pub use error::{error_chain, CycleError, DaemonError, Stage};
pub use log_rotation::LogFiles;
pub use paths::DaemonSettings;
pub use runtime::{init_tracing, run, run_cycles, run_once, start_blocking, LoopSummary};
