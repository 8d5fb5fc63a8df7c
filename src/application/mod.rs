//! Application layer: the startup sequence shared by consumers.

pub mod bootstrap;

pub use bootstrap::{init, BootstrapOptions};
