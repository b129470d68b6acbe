use std::io;

/// Hostname of the machine this process runs on.
pub fn local_hostname() -> io::Result<String> {
    let name = nix::unistd::gethostname()
        .map_err(io::Error::from)?
        .to_string_lossy()
        .into_owned();
    if name.is_empty() {
        return Err(io::Error::new(io::ErrorKind::Other, "hostname is empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_hostname_is_non_empty_without_nul() {
        let name = local_hostname().expect("hostname");
        assert!(!name.is_empty());
        assert!(!name.contains('\0'));
    }

    #[test]
    fn local_hostname_matches_uname_nodename() {
        let uts = nix::sys::utsname::uname().expect("uname");
        assert_eq!(local_hostname().expect("hostname"), uts.nodename().to_string_lossy());
    }
}
