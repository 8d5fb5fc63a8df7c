//! Logging infrastructure
//!
//! A named-logger registry fed by `tracing` events:
//! - Dotted logger names with inherited levels
//! - Console, midnight-rotating file and in-memory handlers
//! - `%(attribute)s` message templates
//! - A pipeline that configures all of the above from INI settings

pub mod config;
pub mod format;
pub mod handler;
pub mod layer;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod rotation;

pub use config::{build_plan, PipelineOptions, LOGGING_SECTION, LOGLEVELS_SECTION};
pub use format::{RecordFormat, BASIC_FORMAT, DEFAULT_FORMAT};
pub use handler::{Handler, HandlerKey, MemoryBuffer};
pub use layer::{install, RegistryLayer};
pub use pipeline::{apply_plan, prepare_logger, prepare_logging, prepare_logging_from_file};
pub use record::LogRecord;
pub use registry::{LogRegistry, ROOT_LOGGER};
pub use rotation::TimedRotatingFile;
