//! The remote-execution seam: run a command on a named host and supervise it.

use std::io::{self, Read, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::command::CommandLine;
use crate::error::{io_err, ExecError};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const DRAIN_CHUNK: usize = 8 * 1024;

/// How a command's output is handled while it runs.
pub struct RunOptions<'a> {
    /// Receives stdout bytes as they arrive.
    pub stdout_tee: Option<&'a mut (dyn Write + Send)>,
    /// Receives stderr bytes as they arrive.
    pub stderr_tee: Option<&'a mut (dyn Write + Send)>,
    /// Keep stdout in [`ExecResult::stdout`].
    pub return_stdout: bool,
    /// Keep stderr in [`ExecResult::stderr`].
    pub return_stderr: bool,
    /// `None` waits for as long as the command runs.
    pub timeout: Option<Duration>,
    /// Flush a tee after every chunk instead of letting it buffer.
    pub flush_tee: bool,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self {
            stdout_tee: None,
            stderr_tee: None,
            return_stdout: true,
            return_stderr: true,
            timeout: None,
            flush_tee: false,
        }
    }
}

/// Outcome of a command that ran to completion with both streams drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code, or `128 + signal` when the process was killed by a signal.
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A machine commands can be run on.
pub trait RemoteHost {
    fn hostname(&self) -> &str;

    fn run(&self, command: &CommandLine, options: RunOptions<'_>) -> Result<ExecResult, ExecError>;
}

/// A host reached over ssh, or directly when it is the local machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshHost {
    hostname: String,
    local: bool,
}

impl SshHost {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            local: false,
        }
    }

    /// `hostname` names this machine; commands are spawned without ssh.
    pub fn local(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            local: true,
        }
    }

    fn build_command(&self, command: &CommandLine) -> Command {
        if self.local {
            let mut process = Command::new(command.program());
            process.args(command.args());
            return process;
        }
        let mut process = Command::new("ssh");
        process
            .args(["-o", "BatchMode=yes", "-T"])
            .arg(&self.hostname)
            .arg(command.to_shell());
        process
    }
}

impl RemoteHost for SshHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn run(&self, command: &CommandLine, options: RunOptions<'_>) -> Result<ExecResult, ExecError> {
        let rendered = command.to_string();
        tracing::debug!(host = %self.hostname, local = self.local, command = %rendered, "spawning");

        let mut child = self
            .build_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: command.program().to_string_lossy().into_owned(),
                source,
            })?;

        supervise(&mut child, &rendered, options)
    }
}

/// Drain both streams on scoped threads while the calling thread waits.
fn supervise(
    child: &mut Child,
    rendered: &str,
    options: RunOptions<'_>,
) -> Result<ExecResult, ExecError> {
    let RunOptions {
        stdout_tee,
        stderr_tee,
        return_stdout,
        return_stderr,
        timeout,
        flush_tee,
    } = options;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    std::thread::scope(|scope| {
        let out = scope.spawn(move || drain(stdout, stdout_tee, return_stdout, flush_tee));
        let err = scope.spawn(move || drain(stderr, stderr_tee, return_stderr, flush_tee));

        let status = wait(child, rendered, timeout);
        let stdout = out
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            .map_err(|e| io_err(format!("reading stdout of [{rendered}]"), e))?;
        let stderr = err
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            .map_err(|e| io_err(format!("reading stderr of [{rendered}]"), e))?;

        Ok(ExecResult {
            exit_status: exit_code(status?),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    })
}

fn drain(
    stream: Option<impl Read>,
    mut tee: Option<&mut (dyn Write + Send)>,
    keep: bool,
    flush: bool,
) -> io::Result<Vec<u8>> {
    let mut kept = Vec::new();
    let Some(mut stream) = stream else {
        return Ok(kept);
    };
    let mut chunk = [0u8; DRAIN_CHUNK];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if let Some(tee) = tee.as_mut() {
            tee.write_all(&chunk[..n])?;
            if flush {
                tee.flush()?;
            }
        }
        if keep {
            kept.extend_from_slice(&chunk[..n]);
        }
    }
    if let Some(tee) = tee.as_mut() {
        tee.flush()?;
    }
    Ok(kept)
}

fn wait(child: &mut Child, rendered: &str, timeout: Option<Duration>) -> Result<ExitStatus, ExecError> {
    let Some(timeout) = timeout else {
        return child
            .wait()
            .map_err(|e| io_err(format!("waiting for [{rendered}]"), e));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| io_err(format!("waiting for [{rendered}]"), e))?
        {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            tracing::warn!(command = %rendered, ?timeout, "command timed out, killing it");
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExecError::Timeout {
                command: rendered.to_owned(),
                timeout,
            });
        }
        std::thread::sleep(WAIT_POLL_INTERVAL);
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}
