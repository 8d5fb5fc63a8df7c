use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::severity::Severity;

/// Number of rotated log files kept next to the active one.
pub const RETAINED_PERIODS: usize = 30;

/// When a rotating file handler rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateAt {
    Midnight,
}

/// One log output to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerSpec {
    /// Standard output.
    Console,
    /// File at `path`, rolled over on schedule.
    RotatingFile {
        path: PathBuf,
        rotate_at: RotateAt,
        retained_periods: usize,
    },
}

impl HandlerSpec {
    /// Midnight-rotating file keeping [`RETAINED_PERIODS`] backups.
    pub fn rotating_file(path: impl Into<PathBuf>) -> Self {
        Self::RotatingFile {
            path: path.into(),
            rotate_at: RotateAt::Midnight,
            retained_periods: RETAINED_PERIODS,
        }
    }
}

/// A `loglevels` entry that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLevel {
    pub logger: String,
    pub value: String,
}

/// Handlers, format and logger levels derived from configuration.
///
/// Computed once per `prepare_logging` call and discarded after it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingPlan {
    /// Logger the handlers are attached to; empty for the root logger.
    pub target_logger: String,
    pub handlers: Vec<HandlerSpec>,
    pub format: String,
    pub logger_levels: Vec<(String, Severity)>,
    pub rejected: Vec<RejectedLevel>,
}

impl LoggingPlan {
    pub fn has_console(&self) -> bool {
        self.handlers.contains(&HandlerSpec::Console)
    }

    /// Path of the file handler, if the plan has one.
    pub fn log_file(&self) -> Option<&PathBuf> {
        self.handlers.iter().find_map(|handler| match handler {
            HandlerSpec::RotatingFile { path, .. } => Some(path),
            HandlerSpec::Console => None,
        })
    }
}
