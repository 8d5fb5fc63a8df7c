use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::format::{RecordFormat, BASIC_FORMAT};
use super::record::LogRecord;
use super::rotation::TimedRotatingFile;
use crate::domain::models::RETAINED_PERIODS;

/// Where a handler writes.
#[derive(Debug)]
enum Sink {
    Stdout,
    Stderr,
    File(Mutex<TimedRotatingFile>),
    Memory(MemoryBuffer),
}

/// Identity used to avoid attaching the same output twice to one logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKey {
    Stdout,
    Stderr,
    File(PathBuf),
    Memory(usize),
}

/// A formatted log output.
#[derive(Debug)]
pub struct Handler {
    sink: Sink,
    format: RecordFormat,
}

impl Handler {
    /// Write to standard output.
    pub fn stdout(format: RecordFormat) -> Self {
        Self {
            sink: Sink::Stdout,
            format,
        }
    }

    /// Write to standard error.
    pub fn stderr(format: RecordFormat) -> Self {
        Self {
            sink: Sink::Stderr,
            format,
        }
    }

    /// Write to `path`, rotating at midnight and keeping `retained_periods` backups.
    pub fn rotating_file(
        path: impl Into<PathBuf>,
        retained_periods: usize,
        format: RecordFormat,
    ) -> io::Result<Self> {
        let file = TimedRotatingFile::open(normalize_path(&path.into()), retained_periods)?;
        Ok(Self {
            sink: Sink::File(Mutex::new(file)),
            format,
        })
    }

    /// Write to `path` with the standard retention.
    pub fn daily_file(path: impl Into<PathBuf>, format: RecordFormat) -> io::Result<Self> {
        Self::rotating_file(path, RETAINED_PERIODS, format)
    }

    /// Collect rendered lines in `buffer`.
    pub fn memory(buffer: MemoryBuffer, format: RecordFormat) -> Self {
        Self {
            sink: Sink::Memory(buffer),
            format,
        }
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    pub fn key(&self) -> HandlerKey {
        match &self.sink {
            Sink::Stdout => HandlerKey::Stdout,
            Sink::Stderr => HandlerKey::Stderr,
            Sink::File(file) => HandlerKey::File(
                file.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .path()
                    .to_path_buf(),
            ),
            Sink::Memory(buffer) => HandlerKey::Memory(buffer.id()),
        }
    }

    /// Whether this handler writes to standard output or standard error.
    pub fn is_console(&self) -> bool {
        matches!(self.sink, Sink::Stdout | Sink::Stderr)
    }

    /// Path of the file this handler writes to, if any.
    pub fn file_path(&self) -> Option<PathBuf> {
        match self.key() {
            HandlerKey::File(path) => Some(path),
            _ => None,
        }
    }

    /// Format and write `record`.
    ///
    /// Failures are reported on stderr; logging never fails the caller.
    pub fn emit(&self, record: &LogRecord) {
        let line = self.format.render(record);
        if let Err(err) = self.write_line(&line) {
            eprintln!("--- logging error: failed to write record: {err}");
        }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        match &self.sink {
            Sink::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Sink::Stderr => writeln!(io::stderr().lock(), "{line}"),
            Sink::File(file) => file
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_line(line),
            Sink::Memory(buffer) => {
                buffer.push(line.to_string());
                Ok(())
            }
        }
    }
}

impl Default for Handler {
    /// Standard error with the plain `%(message)s` template.
    fn default() -> Self {
        Self::stderr(RecordFormat::parse(BASIC_FORMAT))
    }
}

/// Shared in-memory line buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines.
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, line: String) {
        self.lock().push(line);
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.lines) as usize
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `path` made absolute against the current directory, for handler identity.
pub fn normalize_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
