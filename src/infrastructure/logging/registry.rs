use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use super::handler::{Handler, HandlerKey};
use super::record::LogRecord;
use crate::domain::models::Severity;

/// Name of the root logger.
pub const ROOT_LOGGER: &str = "";

const ROOT_DEFAULT_LEVEL: Severity = Severity::Warning;

static GLOBAL: LazyLock<LogRegistry> = LazyLock::new(LogRegistry::new);

#[derive(Debug, Default)]
struct LoggerEntry {
    level: Option<Severity>,
    handlers: Vec<Arc<Handler>>,
}

/// Named loggers with their thresholds and handlers
///
/// Logger names are dotted paths. A logger without a level (or with
/// `NOTSET`) inherits the level of its nearest configured ancestor; the root
/// logger starts at `WARNING`. Records are handed to the handlers of the
/// logger and of every ancestor up to the root.
#[derive(Debug)]
pub struct LogRegistry {
    loggers: Mutex<HashMap<String, LoggerEntry>>,
}

impl LogRegistry {
    /// A registry holding only the root logger.
    pub fn new() -> Self {
        Self {
            loggers: Mutex::new(Self::initial_state()),
        }
    }

    /// The process-wide registry fed by `tracing` events.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn initial_state() -> HashMap<String, LoggerEntry> {
        HashMap::from([(
            ROOT_LOGGER.to_string(),
            LoggerEntry {
                level: Some(ROOT_DEFAULT_LEVEL),
                handlers: Vec::new(),
            },
        )])
    }

    fn state(&self) -> MutexGuard<'_, HashMap<String, LoggerEntry>> {
        self.loggers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_level(&self, logger: &str, level: Severity) {
        self.state().entry(logger.to_string()).or_default().level = Some(level);
    }

    /// Level set directly on `logger`, if any.
    pub fn level(&self, logger: &str) -> Option<Severity> {
        self.state().get(logger).and_then(|entry| entry.level)
    }

    /// Threshold actually applied to records of `logger`.
    pub fn effective_level(&self, logger: &str) -> Severity {
        Self::effective_level_in(&self.state(), logger)
    }

    fn effective_level_in(state: &HashMap<String, LoggerEntry>, logger: &str) -> Severity {
        for name in lineage(logger) {
            let level = state.get(name).and_then(|entry| entry.level);
            if name == ROOT_LOGGER {
                return level.unwrap_or(Severity::NotSet);
            }
            if let Some(level) = level.filter(|l| *l != Severity::NotSet) {
                return level;
            }
        }
        Severity::NotSet
    }

    /// Whether a record of numeric level `level_no` from `logger` passes its threshold.
    pub fn is_enabled_for(&self, logger: &str, level_no: u8) -> bool {
        level_no >= self.effective_level(logger).value()
    }

    /// Attach `handler` to `logger` unless an equivalent one is already there.
    ///
    /// Returns `false` when the handler was a duplicate and has been dropped.
    pub fn add_handler(&self, logger: &str, handler: Handler) -> bool {
        let key = handler.key();
        let mut state = self.state();
        let entry = state.entry(logger.to_string()).or_default();
        if entry.handlers.iter().any(|h| h.key() == key) {
            return false;
        }
        entry.handlers.push(Arc::new(handler));
        true
    }

    pub fn has_handler(&self, logger: &str, key: &HandlerKey) -> bool {
        self.state()
            .get(logger)
            .is_some_and(|entry| entry.handlers.iter().any(|h| &h.key() == key))
    }

    /// Handlers attached directly to `logger`.
    pub fn handlers(&self, logger: &str) -> Vec<Arc<Handler>> {
        self.state()
            .get(logger)
            .map(|entry| entry.handlers.clone())
            .unwrap_or_default()
    }

    /// Hand `record` to every handler from its logger up to the root.
    pub fn dispatch(&self, record: &LogRecord) {
        let handlers: Vec<Arc<Handler>> = {
            let state = self.state();
            if record.level_no < Self::effective_level_in(&state, &record.logger).value() {
                return;
            }
            lineage(&record.logger)
                .filter_map(|name| state.get(name))
                .flat_map(|entry| entry.handlers.iter().cloned())
                .collect()
        };

        for handler in handlers {
            handler.emit(record);
        }
    }

    /// Forget every logger, handler and level.
    ///
    /// Intended for tests that need a clean registry.
    pub fn reset(&self) {
        *self.state() = Self::initial_state();
    }
}

impl Default for LogRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `a.b.c`, `a.b`, `a`, then the root logger.
fn lineage<'a>(logger: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let mut next = Some(logger);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rfind('.').map_or(ROOT_LOGGER, |dot| &current[..dot]))
        };
        Some(current)
    })
}
