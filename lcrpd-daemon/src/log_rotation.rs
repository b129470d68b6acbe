//! Size-based rotation of the files under the daemon log directory.
//!
//! `lcrpd.log` becomes `lcrpd.log.1`, an existing `.1` becomes `.2`, and so
//! on up to [`RotationPolicy::keep`] copies; the oldest copy is discarded.
//! Rotation runs between cycles, so no cycle ever writes across a rotation.
//!
//! The tracing writers hold their file open across events. [`LogFiles::rotate`]
//! is the only place a handle is dropped, and only for a file that was
//! actually rotated; the next event reopens the fresh file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::paths::{err_log_path, log_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// A file at or above this size is rotated.
    pub max_bytes: u64,
    /// Number of numbered copies kept.
    pub keep: usize,
}

impl RotationPolicy {
    pub const DEFAULT: RotationPolicy = RotationPolicy {
        max_bytes: 10 * 1024 * 1024,
        keep: 5,
    };
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Rotate `path` if it is at least `policy.max_bytes` long.
///
/// Returns whether a rotation happened. A missing file is not an error.
pub fn rotate_if_needed(path: &Path, policy: &RotationPolicy) -> io::Result<bool> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if len < policy.max_bytes || policy.keep == 0 {
        return Ok(false);
    }

    remove_if_exists(&numbered(path, policy.keep))?;
    for n in (1..policy.keep).rev() {
        let from = numbered(path, n);
        if from.exists() {
            fs::rename(&from, numbered(path, n + 1))?;
        }
    }
    fs::rename(path, numbered(path, 1))?;
    fs::File::create(path)?;
    Ok(true)
}

/// An append-mode log file shared by every tracing event.
///
/// Opened on first use and kept open. Clones share the handle.
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl AppendLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotate under the handle lock so no event lands in the renamed file,
    /// then drop the handle unless the file was left untouched.
    pub fn rotate(&self, policy: &RotationPolicy) -> io::Result<bool> {
        let mut file = self.lock();
        let rotated = rotate_if_needed(&self.path, policy);
        if !matches!(rotated, Ok(false)) {
            *file = None;
        }
        rotated
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<'a> MakeWriter<'a> for AppendLog {
    type Writer = AppendLogWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        let mut file = self.lock();
        if file.is_none() {
            *file = OpenOptions::new().create(true).append(true).open(&self.path).ok();
        }
        AppendLogWriter { file }
    }
}

/// Holds the file lock for one event. Output is discarded if the file could
/// not be opened.
pub struct AppendLogWriter<'a> {
    file: MutexGuard<'a, Option<File>>,
}

impl Write for AppendLogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `lcrpd.log` and `lcrpd-err.log` under one log directory.
#[derive(Debug, Clone)]
pub struct LogFiles {
    all: AppendLog,
    errors: AppendLog,
    policy: RotationPolicy,
}

impl LogFiles {
    pub fn new(log_dir: &Path) -> Self {
        Self {
            all: AppendLog::new(log_path(log_dir)),
            errors: AppendLog::new(err_log_path(log_dir)),
            policy: RotationPolicy::DEFAULT,
        }
    }

    pub fn with_policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Every event goes here.
    pub fn all(&self) -> &AppendLog {
        &self.all
    }

    /// Error events also go here.
    pub fn errors(&self) -> &AppendLog {
        &self.errors
    }

    /// Rotate both files; a failure on one is logged and does not stop the
    /// other.
    pub fn rotate(&self) {
        for log in [&self.all, &self.errors] {
            // The lock is released before logging: the event writes to `log`.
            let outcome = log.rotate(&self.policy);
            let path = log.path().display();
            match outcome {
                Ok(true) => tracing::info!(path = %path, "log file rotated"),
                Ok(false) => {}
                Err(err) => tracing::warn!(path = %path, error = %err, "log rotation failed"),
            }
        }
    }
}

fn numbered(base: &Path, n: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
