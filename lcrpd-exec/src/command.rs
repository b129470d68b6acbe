//! Program + argument vector, rendered for logs and for remote shells.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::ffi::{OsStrExt, OsStringExt};

/// An executable and its ordered arguments, kept as raw OS strings so paths
/// that are not valid UTF-8 reach `exec` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Render for a POSIX shell on the far side of an ssh connection.
    ///
    /// Words made only of shell-inert bytes are left bare, so the common case
    /// reads exactly like [`fmt::Display`]. Bytes are preserved as-is.
    pub fn to_shell(&self) -> OsString {
        let mut out = Vec::new();
        for (i, word) in std::iter::once(&self.program).chain(&self.args).enumerate() {
            if i > 0 {
                out.push(b' ');
            }
            shell_quote(word.as_bytes(), &mut out);
        }
        OsString::from_vec(out)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

fn shell_quote(word: &[u8], out: &mut Vec<u8>) {
    let inert = |b: &u8| b.is_ascii_alphanumeric() || b"-_./=:,+@%".contains(b);
    if !word.is_empty() && word.iter().all(inert) {
        out.extend_from_slice(word);
        return;
    }
    out.push(b'\'');
    for &b in word {
        if b == b'\'' {
            out.extend_from_slice(br"'\''");
        } else {
            out.push(b);
        }
    }
    out.push(b'\'');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_with_single_spaces() {
        let cmd = CommandLine::new("/opt/lcrp/lcrp_changelog")
            .arg("-d")
            .arg("/var/lcrp")
            .arg("-u")
            .arg("cl1");
        assert_eq!(cmd.to_string(), "/opt/lcrp/lcrp_changelog -d /var/lcrp -u cl1");
    }

    #[test]
    fn to_shell_leaves_plain_words_bare() {
        let cmd = CommandLine::new("lcrp_changelog").arg("-m").arg("lustre1-MDT0000");
        assert_eq!(cmd.to_shell(), OsString::from(cmd.to_string()));
    }

    #[test]
    fn to_shell_quotes_spaces_and_single_quotes() {
        let cmd = CommandLine::new("echo").arg("a b").arg("it's").arg("");
        assert_eq!(cmd.to_shell(), OsString::from(r"echo 'a b' 'it'\''s' ''"));
    }

    #[test]
    fn non_utf8_bytes_survive_everywhere_but_display() {
        let dir = OsStr::from_bytes(b"/srv/bin\xff/src/lcrp_changelog");
        let cmd = CommandLine::new(dir).arg("-d");

        assert_eq!(cmd.program(), dir);
        assert_eq!(
            cmd.to_shell().as_bytes(),
            b"'/srv/bin\xff/src/lcrp_changelog' -d".as_slice()
        );
        assert_eq!(cmd.to_string(), "/srv/bin\u{fffd}/src/lcrp_changelog -d");
    }
}
