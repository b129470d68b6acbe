//! Command execution against a (possibly remote) host with live output tee-ing.
//!
//! - [`host`] — [`RemoteHost`], [`SshHost`], [`RunOptions`], [`ExecResult`]
//! - [`command`] — [`CommandLine`]
//! - [`sink`] — [`LineSink`] and the [`LineWatcher`]s that log each line
//! - [`hostname`] — local hostname lookup

pub mod command;
mod error;
pub mod host;
pub mod hostname;
pub mod sink;

pub use command::CommandLine;
pub use error::ExecError;
pub use host::{ExecResult, RemoteHost, RunOptions, SshHost};
pub use hostname::local_hostname;
pub use sink::{LineSink, LineWatcher, LogError, LogInfo};
