//! Locating helper executables shipped next to the daemon.

use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Path to run helper command `name`.
///
/// When the daemon was started through a path (`invocation` contains `/`),
/// `<dir of invocation>/src/<name>` is preferred if it is an executable file,
/// which covers running from a build tree. Otherwise the bare `name` is
/// returned and left to `$PATH`. Nothing is cached; each call looks again.
pub fn resolve_command_path(invocation: &Path, name: &str) -> PathBuf {
    if invocation.as_os_str().as_bytes().contains(&b'/') {
        let dir = invocation.parent().unwrap_or_else(|| Path::new("/"));
        let candidate = dir.join("src").join(name);
        if is_executable(&candidate) {
            return candidate;
        }
    }
    PathBuf::from(name)
}

/// A regular file (after following symlinks) with at least one execute bit.
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
