//! Running `lcrp_changelog` for one cycle.

use std::path::Path;

use lcrpd_core::ValidatedParameters;
use lcrpd_exec::{CommandLine, ExecError, LineSink, LogError, LogInfo, RemoteHost, RunOptions};

use crate::command_path::resolve_command_path;

pub const LCRP_CMD_CHANGELOG: &str = "lcrp_changelog";

/// Metadata target whose changelog is read; always the first MDT.
pub const MDT_SUFFIX: &str = "-MDT0000";

/// `<program> -d <lcrp_dir> -m <fsname>-MDT0000 -u <changelog_user>`
pub fn changelog_command(program: &Path, params: &ValidatedParameters) -> CommandLine {
    CommandLine::new(program)
        .arg("-d")
        .arg(params.lcrp_dir())
        .arg("-m")
        .arg(format!("{}{MDT_SUFFIX}", params.fsname()))
        .arg("-u")
        .arg(params.changelog_user())
}

/// Resolve, build and run the changelog reader on `host`, logging its stdout
/// at info and its stderr at error level. Returns the reader's exit status.
pub fn invoke<H>(
    host: &H,
    params: &ValidatedParameters,
    invocation: &Path,
) -> Result<i32, ExecError>
where
    H: RemoteHost + ?Sized,
{
    let program = resolve_command_path(invocation, LCRP_CMD_CHANGELOG);
    let command = changelog_command(&program, params);
    let stdout = LineSink::null(host.hostname(), LogInfo);
    let stderr = LineSink::null(host.hostname(), LogError);
    run_teed(host, &command, stdout, stderr)
}

/// Run `command` streaming into the two sinks. The sinks are owned here and
/// released when this returns, whether `run` succeeded or not.
pub fn run_teed<H>(
    host: &H,
    command: &CommandLine,
    mut stdout: LineSink,
    mut stderr: LineSink,
) -> Result<i32, ExecError>
where
    H: RemoteHost + ?Sized,
{
    tracing::debug!(
        "start to run command [{}] on host [{}]",
        command,
        host.hostname()
    );
    let result = host.run(
        command,
        RunOptions {
            stdout_tee: Some(&mut stdout),
            stderr_tee: Some(&mut stderr),
            return_stdout: false,
            return_stderr: false,
            timeout: None,
            flush_tee: true,
        },
    )?;
    Ok(result.exit_status)
}
