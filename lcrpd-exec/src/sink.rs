//! Write-only output sinks that log every line passing through them.
//!
//! A [`LineSink`] sits between a subprocess stream and a target writer. The
//! raw bytes go to the target (usually a discard target, see
//! [`LineSink::null`]); every complete line is also handed to a
//! [`LineWatcher`] together with the hostname the command ran on.

use std::io::{self, Write};

/// Receives each line written to a [`LineSink`].
pub trait LineWatcher: Send {
    fn on_line(&mut self, hostname: &str, line: &str);
}

/// Logs each line at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogInfo;

impl LineWatcher for LogInfo {
    fn on_line(&mut self, hostname: &str, line: &str) {
        tracing::info!(host = %hostname, "{line}");
    }
}

/// Logs each line at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogError;

impl LineWatcher for LogError {
    fn on_line(&mut self, hostname: &str, line: &str) {
        tracing::error!(host = %hostname, "{line}");
    }
}

/// A line-annotating stream handle. Released exactly once: by [`close`]
/// or, failing that, on drop.
///
/// [`close`]: LineSink::close
pub struct LineSink {
    hostname: String,
    watcher: Box<dyn LineWatcher>,
    target: Option<Box<dyn Write + Send>>,
    pending: Vec<u8>,
}

impl LineSink {
    pub fn new(
        target: impl Write + Send + 'static,
        hostname: impl Into<String>,
        watcher: impl LineWatcher + 'static,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            watcher: Box::new(watcher),
            target: Some(Box::new(target)),
            pending: Vec::new(),
        }
    }

    /// A sink whose bytes are discarded once their lines have been watched.
    pub fn null(hostname: impl Into<String>, watcher: impl LineWatcher + 'static) -> Self {
        Self::new(io::sink(), hostname, watcher)
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn is_closed(&self) -> bool {
        self.target.is_none()
    }

    /// Emit a trailing unterminated line, flush, and release the target.
    /// Later calls are no-ops.
    pub fn close(&mut self) -> io::Result<()> {
        let Some(mut target) = self.target.take() else {
            return Ok(());
        };
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
        target.flush()
    }

    fn emit(&mut self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let text = String::from_utf8_lossy(line);
        self.watcher.on_line(&self.hostname, &text);
    }
}

impl Write for LineSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(target) = self.target.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is closed"));
        };
        target.write_all(buf)?;

        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line[..pos]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.target.as_mut() {
            Some(target) => target.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for LineSink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(host = %self.hostname, error = %err, "failed to close output sink");
        }
    }
}

impl std::fmt::Debug for LineSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSink")
            .field("hostname", &self.hostname)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(String, String)>>>);

    impl LineWatcher for Recorder {
        fn on_line(&mut self, hostname: &str, line: &str) {
            self.0
                .lock()
                .unwrap()
                .push((hostname.to_owned(), line.to_owned()));
        }
    }

    impl Recorder {
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|(_, l)| l.clone()).collect()
        }
    }

    #[test]
    fn lines_split_across_writes_are_reassembled() {
        let recorder = Recorder::default();
        let mut sink = LineSink::null("mds01", recorder.clone());

        sink.write_all(b"first li").unwrap();
        sink.write_all(b"ne\nsecond\r\nthi").unwrap();
        assert_eq!(recorder.lines(), vec!["first line", "second"]);

        sink.close().unwrap();
        assert_eq!(recorder.lines(), vec!["first line", "second", "thi"]);
    }

    #[test]
    fn lines_carry_hostname() {
        let recorder = Recorder::default();
        let mut sink = LineSink::null("mds01", recorder.clone());
        sink.write_all(b"hello\n").unwrap();

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen, vec![("mds01".to_owned(), "hello".to_owned())]);
    }

    #[test]
    fn raw_bytes_reach_the_target() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        struct Shared(Arc<Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, b: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(b);
                Ok(b.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = LineSink::new(Shared(buf.clone()), "mds01", LogInfo);
        sink.write_all(b"a\nb").unwrap();
        drop(sink);
        assert_eq!(buf.lock().unwrap().as_slice(), b"a\nb");
    }

    #[test]
    fn close_is_idempotent_and_blocks_writes() {
        let recorder = Recorder::default();
        let mut sink = LineSink::null("mds01", recorder.clone());
        sink.write_all(b"tail").unwrap();

        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert_eq!(recorder.lines(), vec!["tail"]);

        let err = sink.write(b"late\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn drop_flushes_partial_line() {
        let recorder = Recorder::default();
        {
            let mut sink = LineSink::null("mds01", recorder.clone());
            sink.write_all(b"no newline").unwrap();
        }
        assert_eq!(recorder.lines(), vec!["no newline"]);
    }
}
