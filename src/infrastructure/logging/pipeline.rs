//! Installing a [`LoggingPlan`] into the logger registry

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::{error, info};

use super::config::{build_plan, PipelineOptions};
use super::format::RecordFormat;
use super::handler::{normalize_path, Handler, HandlerKey};
use super::layer::install;
use super::registry::LogRegistry;
use crate::domain::errors::{LoggingError, LoggingResult};
use crate::domain::models::{HandlerSpec, LoggingPlan, RejectedLevel, Severity};
use crate::infrastructure::config::ConfigHandle;

static PIPELINE_LOCK: Mutex<()> = Mutex::new(());

/// Configure process logging from `config`.
///
/// Installs the registry as the global `tracing` subscriber on first use,
/// then attaches the configured handlers and sets logger levels. Calling it
/// again with the same configuration adds nothing.
///
/// Fails with [`LoggingError::SubscriberConflict`] when some other global
/// subscriber is already set. Applications that own their subscriber add
/// [`RegistryLayer`](super::layer::RegistryLayer) to it and use
/// [`build_plan`] with [`apply_plan`].
pub fn prepare_logging(
    config: Option<&ConfigHandle>,
    options: &PipelineOptions,
) -> LoggingResult<()> {
    let _guard = PIPELINE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    ensure_installed()?;
    let plan = build_plan(config, options)?;
    apply_plan(LogRegistry::global(), &plan)
}

/// Read the INI file at `path` and configure logging from it.
///
/// The handle is not stored as the process-wide configuration.
pub fn prepare_logging_from_file(path: &Path, options: &PipelineOptions) -> LoggingResult<()> {
    let module_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let config = ConfigHandle::load_file(&module_name, path, None)?;
    prepare_logging(Some(&config), options)
}

/// Set `name`'s level and attach `handlers`.
///
/// Without handlers, a single standard-error handler printing only the
/// message is attached.
pub fn prepare_logger(
    name: &str,
    level: Option<Severity>,
    handlers: Option<Vec<Handler>>,
) -> LoggingResult<()> {
    ensure_installed()?;
    let registry = LogRegistry::global();
    if let Some(level) = level {
        registry.set_level(name, level);
    }
    for handler in handlers.unwrap_or_else(|| vec![Handler::default()]) {
        registry.add_handler(name, handler);
    }
    Ok(())
}

fn ensure_installed() -> LoggingResult<()> {
    if install() {
        Ok(())
    } else {
        Err(LoggingError::SubscriberConflict)
    }
}

/// Attach the plan's handlers and set its levels on `registry`.
///
/// Handlers already present on the target logger are skipped. A file that
/// cannot be opened aborts the remaining steps; handlers attached before it
/// stay in place.
pub fn apply_plan(registry: &LogRegistry, plan: &LoggingPlan) -> LoggingResult<()> {
    let format = RecordFormat::parse(&plan.format);
    let target = plan.target_logger.as_str();

    for spec in &plan.handlers {
        match spec {
            HandlerSpec::Console => {
                registry.add_handler(target, Handler::stdout(format.clone()));
            }
            HandlerSpec::RotatingFile {
                path,
                retained_periods,
                ..
            } => {
                if registry.has_handler(target, &HandlerKey::File(normalize_path(path))) {
                    continue;
                }
                let handler = Handler::rotating_file(path, *retained_periods, format.clone())
                    .map_err(|source| LoggingError::HandlerInstallation {
                        path: path.clone(),
                        source,
                    })?;
                registry.add_handler(target, handler);
            }
        }
    }

    for step in level_steps(plan) {
        match step {
            LevelStep::Set(logger, level) => {
                info!("setting logger {logger} to {level}");
                registry.set_level(logger, level);
            }
            LevelStep::Reject(rejected) => {
                info!("setting logger {} to {}", rejected.logger, rejected.value);
                error!(
                    "unrecognised loglevel {} for logger {}, skipping",
                    rejected.value, rejected.logger
                );
            }
        }
    }
    Ok(())
}

enum LevelStep<'a> {
    Set(&'a str, Severity),
    Reject(&'a RejectedLevel),
}

impl LevelStep<'_> {
    fn logger(&self) -> &str {
        match self {
            Self::Set(logger, _) => logger,
            Self::Reject(rejected) => &rejected.logger,
        }
    }
}

/// Accepted and rejected entries interleaved in logger-name order.
fn level_steps(plan: &LoggingPlan) -> Vec<LevelStep<'_>> {
    let mut steps: Vec<LevelStep<'_>> = plan
        .logger_levels
        .iter()
        .map(|(logger, level)| LevelStep::Set(logger, *level))
        .chain(plan.rejected.iter().map(LevelStep::Reject))
        .collect();
    steps.sort_by(|a, b| a.logger().cmp(b.logger()));
    steps
}
