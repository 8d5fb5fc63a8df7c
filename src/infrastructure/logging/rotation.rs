//! Midnight log file rotation
//!
//! The active file always lives at the configured path. The first write after
//! local midnight renames it to `<path>.<YYYY-MM-DD>` (the day that just
//! ended), opens a fresh file, and deletes the oldest dated backups beyond the
//! retention count.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d";

/// An append-only file that rolls over at local midnight.
#[derive(Debug)]
pub struct TimedRotatingFile {
    path: PathBuf,
    retained_periods: usize,
    file: File,
    rollover_at: DateTime<Local>,
}

impl TimedRotatingFile {
    /// Open (or create) the file at `path`.
    ///
    /// Parent directories are not created; a missing or unwritable directory
    /// is an error.
    pub fn open(path: impl Into<PathBuf>, retained_periods: usize) -> io::Result<Self> {
        Self::open_at(path, retained_periods, Local::now())
    }

    /// Open as if the current time were `now`.
    ///
    /// An existing file keeps the period of its last modification, so lines
    /// written before a restart on an earlier day are rotated out by the
    /// first write.
    pub fn open_at(
        path: impl Into<PathBuf>,
        retained_periods: usize,
        now: DateTime<Local>,
    ) -> io::Result<Self> {
        let path = path.into();
        let last_write = last_modified(&path).filter(|modified| *modified < now);
        let file = open_append(&path)?;
        Ok(Self {
            path,
            retained_periods,
            file,
            rollover_at: next_midnight(last_write.unwrap_or(now)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next rollover instant.
    pub fn rollover_at(&self) -> DateTime<Local> {
        self.rollover_at
    }

    /// Append `line` and a newline, rotating first if midnight has passed.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.write_line_at(line, Local::now())
    }

    /// Append `line` as if the current time were `now`.
    pub fn write_line_at(&mut self, line: &str, now: DateTime<Local>) -> io::Result<()> {
        if now >= self.rollover_at {
            self.rollover(now)?;
        }
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()
    }

    fn rollover(&mut self, now: DateTime<Local>) -> io::Result<()> {
        let period = (self.rollover_at - Duration::days(1)).date_naive();
        let backup = backup_path(&self.path, period);

        self.file.flush()?;
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        if self.path.exists() {
            fs::rename(&self.path, &backup)?;
        }
        self.file = open_append(&self.path)?;
        self.rollover_at = next_midnight(now);

        self.prune_backups()
    }

    /// Delete the oldest dated backups beyond `retained_periods`.
    fn prune_backups(&self) -> io::Result<()> {
        let mut backups = dated_backups(&self.path)?;
        if backups.len() <= self.retained_periods {
            return Ok(());
        }
        backups.sort();
        let excess = backups.len() - self.retained_periods;
        for (_, path) in backups.into_iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn last_modified(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Some(DateTime::<Local>::from(modified))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `<path>.<YYYY-MM-DD>`
pub fn backup_path(path: &Path, period: NaiveDate) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(period.format(BACKUP_DATE_FORMAT).to_string());
    PathBuf::from(name)
}

/// Dated backups of `path` found in its directory.
pub fn dated_backups(path: &Path) -> io::Result<Vec<(NaiveDate, PathBuf)>> {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Ok(Vec::new());
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = format!("{file_name}.");

    let mut backups = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(suffix) = name.strip_prefix(&prefix) else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(suffix, BACKUP_DATE_FORMAT) {
            backups.push((date, entry.path()));
        }
    }
    Ok(backups)
}

/// First local midnight strictly after `now`.
fn next_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let tomorrow = now.date_naive() + Duration::days(1);
    tomorrow
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| now + Duration::days(1))
}
