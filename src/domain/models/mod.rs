//! Domain models shared by the configuration and logging layers.

pub mod logging_plan;
pub mod severity;

pub use logging_plan::{HandlerSpec, LoggingPlan, RejectedLevel, RotateAt, RETAINED_PERIODS};
pub use severity::Severity;
