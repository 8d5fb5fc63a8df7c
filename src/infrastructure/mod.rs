//! Infrastructure layer module
//!
//! - Configuration resolution and typed access
//! - Logging pipeline and logger registry

pub mod config;
pub mod logging;
