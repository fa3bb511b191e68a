//! Per-test log sink.
//!
//! Each test gets its own `tracing` dispatcher writing to `<test root>/test.log`
//! or to the shared stdout stream. The runner installs it as the thread-local
//! default for the duration of the test, so every `tracing` event emitted by a
//! command lands in that test's log and nowhere else.

use crate::config::LogTarget;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::Dispatch;

pub const LOG_FILE: &str = "test.log";

pub struct LogSink {
    dispatch: Dispatch,
    path: Option<PathBuf>,
}

impl LogSink {
    /// Opens the sink for a test whose temp root is `root`.
    pub fn open(target: LogTarget, root: &Path) -> io::Result<Self> {
        match target {
            LogTarget::File => {
                let path = root.join(LOG_FILE);
                let file: File = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .mode(0o600)
                    .open(&path)?;
                let subscriber = tracing_subscriber::fmt()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_max_level(LevelFilter::DEBUG)
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                Ok(Self {
                    dispatch: Dispatch::new(subscriber),
                    path: Some(path),
                })
            }
            LogTarget::Stdout => {
                let subscriber = tracing_subscriber::fmt()
                    .with_writer(io::stdout)
                    .with_max_level(LevelFilter::DEBUG)
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                Ok(Self {
                    dispatch: Dispatch::new(subscriber),
                    path: None,
                })
            }
        }
    }

    /// Runs `f` with this sink as the current thread's default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Log file path, `None` when logging to stdout.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Closes the sink. The file is unbuffered, so dropping the writer is enough.
    pub fn close(self) {
        drop(self);
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_captures_scoped_events() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::open(LogTarget::File, dir.path()).unwrap();
        sink.in_scope(|| tracing::info!("hello from the sink"));
        tracing::info!("outside the scope");
        let path = sink.path().unwrap().to_path_buf();
        sink.close();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("hello from the sink"));
        assert!(!text.contains("outside the scope"));
    }

    #[test]
    fn test_stdout_sink_has_no_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::open(LogTarget::Stdout, dir.path()).unwrap();
        assert!(sink.path().is_none());
        assert!(!dir.path().join(LOG_FILE).exists());
    }
}
