//! Domain errors for configuration resolution and logging setup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Render an optional source path for error messages.
fn display_source(path: Option<&PathBuf>) -> String {
    path.map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
}

/// Errors raised while reading or querying a configuration source.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {} at line {line}: {message}", display_source(.path.as_ref()))]
    Parse {
        path: Option<PathBuf>,
        line: usize,
        message: String,
    },

    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a {expected}: [{section}] {key} = {value:?}")]
    Type {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Bad interpolation in [{section}] {key}: {reason}")]
    Interpolation {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Failed to extract configuration {target}: {source}")]
    Extract {
        target: String,
        #[source]
        source: Box<figment::Error>,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A severity token outside the fixed `CRITICAL..NOTSET` set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognised log level: {0}")]
pub struct UnknownSeverity(pub String);

/// Errors raised while installing the logging pipeline.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to install log handler for {}: {source}", .path.display())]
    HandlerInstallation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid logging configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Another global tracing subscriber is installed; add RegistryLayer to it and call apply_plan instead"
    )]
    SubscriberConflict,
}

pub type LoggingResult<T> = Result<T, LoggingError>;
