//! Configuration management infrastructure
//!
//! INI configuration resolved from a fixed search path:
//! - Candidate discovery (pure, see [`search`])
//! - INI parsing with `%(name)s` interpolation
//! - Typed getters with default fallback
//! - Typed extraction through figment
//! - A process-wide, first-call-wins accessor

pub mod handle;
pub mod ini;
pub mod loader;
pub mod provider;
pub mod search;

pub use handle::ConfigHandle;
pub use ini::{IniDocument, DEFAULT_SECTION};
pub use loader::ConfigLoader;
pub use search::{candidate_paths, find_config, SearchRoots};
