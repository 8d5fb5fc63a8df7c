use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::UnknownSeverity;

/// Logging threshold, ordered `Critical > Error > Warning > Info > Debug > NotSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[serde(rename = "NOTSET")]
    NotSet,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// Numeric value given to `tracing::Level::TRACE` records; below `DEBUG`.
pub const TRACE_LEVEL_NO: u8 = 5;

impl Severity {
    /// All accepted severities, highest first.
    pub const ALL: [Self; 6] = [
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Debug,
        Self::NotSet,
    ];

    /// Numeric level (`CRITICAL` = 50 ... `NOTSET` = 0).
    pub const fn value(self) -> u8 {
        match self {
            Self::Critical => 50,
            Self::Error => 40,
            Self::Warning => 30,
            Self::Info => 20,
            Self::Debug => 10,
            Self::NotSet => 0,
        }
    }

    /// Canonical uppercase token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::NotSet => "NOTSET",
        }
    }

    /// Numeric level of a `tracing` event.
    pub fn level_no(level: &tracing::Level) -> u8 {
        match *level {
            tracing::Level::ERROR => Self::Error.value(),
            tracing::Level::WARN => Self::Warning.value(),
            tracing::Level::INFO => Self::Info.value(),
            tracing::Level::DEBUG => Self::Debug.value(),
            tracing::Level::TRACE => TRACE_LEVEL_NO,
        }
    }

    /// Level name printed for a `tracing` event.
    pub fn level_name(level: &tracing::Level) -> &'static str {
        match *level {
            tracing::Level::ERROR => Self::Error.as_str(),
            tracing::Level::WARN => Self::Warning.as_str(),
            tracing::Level::INFO => Self::Info.as_str(),
            tracing::Level::DEBUG => Self::Debug.as_str(),
            tracing::Level::TRACE => "TRACE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    /// Tokens are matched exactly; `debug` is not `DEBUG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}
