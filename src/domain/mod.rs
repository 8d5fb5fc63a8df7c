//! Domain layer for loxcommon
//!
//! Error types and the plain data models that the infrastructure layer
//! produces and consumes.

pub mod errors;
pub mod models;

// Re-export error types for convenient access
pub use errors::{
    ConfigError, ConfigResult, LoggingError, LoggingResult, UnknownSeverity,
};
