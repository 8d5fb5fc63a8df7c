use std::fmt::{self, Write as _};
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::field::{Field, Visit};
use tracing::{Event, Level};

use crate::domain::models::Severity;

/// One log event, captured for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub created: DateTime<Local>,
    /// Dotted logger name.
    pub logger: String,
    pub level_no: u8,
    pub level_name: &'static str,
    /// Source path as recorded by the callsite.
    pub pathname: Option<String>,
    pub lineno: Option<u32>,
    pub module_path: Option<String>,
    pub thread_name: String,
    pub thread_id: String,
    pub process_id: u32,
    pub message: String,
}

impl LogRecord {
    /// A record for `logger` at `level`, stamped with the current time and thread.
    pub fn new(logger: impl Into<String>, level: &Level, message: impl Into<String>) -> Self {
        let thread = std::thread::current();
        Self {
            created: Local::now(),
            logger: logger.into(),
            level_no: Severity::level_no(level),
            level_name: Severity::level_name(level),
            pathname: None,
            lineno: None,
            module_path: None,
            thread_name: thread.name().unwrap_or("unnamed").to_string(),
            thread_id: format!("{:?}", thread.id()),
            process_id: std::process::id(),
            message: message.into(),
        }
    }

    /// Capture a `tracing` event.
    pub fn from_event(event: &Event<'_>) -> Self {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut record = Self::new(
            logger_name(metadata.target()),
            metadata.level(),
            visitor.finish(),
        );
        record.pathname = metadata.file().map(str::to_string);
        record.lineno = metadata.line();
        record.module_path = metadata.module_path().map(str::to_string);
        record
    }

    /// Source file name without directories.
    pub fn filename(&self) -> String {
        self.pathname
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map_or_else(|| "?".to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Source file stem, or the last module path segment when there is no file.
    pub fn module(&self) -> String {
        if let Some(stem) = self
            .pathname
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
        {
            return stem.to_string_lossy().into_owned();
        }
        self.module_path
            .as_deref()
            .and_then(|m| m.rsplit("::").next())
            .unwrap_or("?")
            .to_string()
    }
}

/// Map a `tracing` target (`a::b`) to a dotted logger name (`a.b`).
pub fn logger_name(target: &str) -> String {
    target.replace("::", ".")
}

/// Collects the `message` field and appends the rest as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
