//! loxcommon - shared configuration and logging bootstrap
//!
//! Locates an INI configuration file for an application, exposes typed
//! accessors over it, and sets up a logging pipeline (console and
//! midnight-rotating file handlers, message templates, per-logger levels)
//! driven by that same file.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): errors, severities and the logging plan
//! - **Infrastructure Layer** (`infrastructure`): INI resolution and the logger registry
//! - **Application Layer** (`application`): the startup sequence
//!
//! # Example
//!
//! ```no_run
//! use loxcommon::application::{init, BootstrapOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = init(&BootstrapOptions::new("myapp"))?;
//!     let workers = config.get_int_or("server", "workers", 4)?;
//!     tracing::info!(target: "myapp", workers, "starting");
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::{init, BootstrapOptions};
pub use domain::models::{HandlerSpec, LoggingPlan, RejectedLevel, RotateAt, Severity};
pub use domain::{ConfigError, ConfigResult, LoggingError, LoggingResult, UnknownSeverity};
pub use infrastructure::config::{ConfigHandle, ConfigLoader, SearchRoots};
pub use infrastructure::logging::{
    build_plan, prepare_logger, prepare_logging, prepare_logging_from_file, Handler,
    LogRegistry, MemoryBuffer, PipelineOptions, RecordFormat,
};
