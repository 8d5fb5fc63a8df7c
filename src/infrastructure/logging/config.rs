use std::path::PathBuf;

use crate::domain::errors::LoggingResult;
use crate::domain::models::{HandlerSpec, LoggingPlan, RejectedLevel, Severity};
use crate::infrastructure::config::{ConfigHandle, DEFAULT_SECTION};

use super::format::DEFAULT_FORMAT;

/// Section holding `console`, `logfile` and `format`.
pub const LOGGING_SECTION: &str = "logging";

/// Section mapping logger names to severities.
pub const LOGLEVELS_SECTION: &str = "loglevels";

/// Caller-side inputs to the logging pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Log file used when the configuration names none; only if it exists.
    pub fallback_log_path: Option<PathBuf>,

    /// Logger receiving the handlers; the root logger when `None`.
    pub default_logger: Option<String>,

    /// Level given to `default_logger` when there is no `loglevels` section.
    pub default_level: Severity,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fallback_log_path: None,
            default_logger: None,
            default_level: Severity::NotSet,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn with_fallback_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_log_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_default_logger(mut self, logger: impl Into<String>) -> Self {
        self.default_logger = Some(logger.into());
        self
    }

    #[must_use]
    pub const fn with_default_level(mut self, level: Severity) -> Self {
        self.default_level = level;
        self
    }

    /// Name of the logger handlers are attached to.
    pub fn target_logger(&self) -> String {
        self.default_logger.clone().unwrap_or_default()
    }
}

/// Derive handlers, format and logger levels from `config`.
///
/// Has no side effects. Type errors in the configuration are returned;
/// unknown severities in `loglevels` are collected in
/// [`LoggingPlan::rejected`].
pub fn build_plan(
    config: Option<&ConfigHandle>,
    options: &PipelineOptions,
) -> LoggingResult<LoggingPlan> {
    let mut handlers = Vec::new();
    if console_enabled(config)? {
        handlers.push(HandlerSpec::Console);
    }
    if let Some(path) = log_file(config, options)? {
        handlers.push(HandlerSpec::rotating_file(path));
    }

    let format = config
        .and_then(|c| c.get_raw(LOGGING_SECTION, "format"))
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FORMAT)
        .to_string();

    let target_logger = options.target_logger();
    let mut logger_levels = Vec::new();
    let mut rejected = Vec::new();
    match config.and_then(|c| c.section_entries(LOGLEVELS_SECTION)) {
        Some(entries) => {
            for (logger, value) in entries {
                match value.trim().parse::<Severity>() {
                    Ok(level) => logger_levels.push((logger.clone(), level)),
                    Err(_) => rejected.push(RejectedLevel {
                        logger: logger.clone(),
                        value: value.clone(),
                    }),
                }
            }
        }
        None => logger_levels.push((target_logger.clone(), options.default_level)),
    }

    Ok(LoggingPlan {
        target_logger,
        handlers,
        format,
        logger_levels,
        rejected,
    })
}

/// `logging.console`, then `DEFAULT.console`, then enabled.
fn console_enabled(config: Option<&ConfigHandle>) -> LoggingResult<bool> {
    let Some(config) = config else {
        return Ok(true);
    };
    if let Some(enabled) = config.get_bool(LOGGING_SECTION, "console")? {
        return Ok(enabled);
    }
    Ok(config.get_bool(DEFAULT_SECTION, "console")?.unwrap_or(true))
}

/// `logging.logfile`, else the fallback path when it exists on disk.
fn log_file(
    config: Option<&ConfigHandle>,
    options: &PipelineOptions,
) -> LoggingResult<Option<PathBuf>> {
    if let Some(config) = config {
        if let Some(path) = config.get_string(LOGGING_SECTION, "logfile")? {
            if !path.trim().is_empty() {
                return Ok(Some(PathBuf::from(path.trim())));
            }
        }
    }
    Ok(options
        .fallback_log_path
        .as_ref()
        .filter(|path| path.exists())
        .cloned())
}
