//! Configuration file discovery
//!
//! Candidate locations, highest precedence first:
//! 1. `./{module}.ini`
//! 2. `~/.config/{module}/config.ini`
//! 3. `~/{module}.ini`
//! 4. `/etc/{module}.ini`
//!
//! The first candidate that exists is used; the others are not read.

use std::path::{Path, PathBuf};

/// Directories the search is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoots {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
    pub system: PathBuf,
}

impl SearchRoots {
    /// Roots for the running process: current directory, home directory, `/etc`.
    pub fn from_env() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            home: dirs::home_dir(),
            system: PathBuf::from("/etc"),
        }
    }
}

/// Candidate paths for `module_name`, in precedence order.
///
/// Home-relative candidates are omitted when there is no home directory.
pub fn candidate_paths(module_name: &str, roots: &SearchRoots) -> Vec<PathBuf> {
    let file_name = format!("{module_name}.ini");
    let mut candidates = Vec::with_capacity(4);

    candidates.push(roots.cwd.join(&file_name));
    if let Some(home) = &roots.home {
        candidates.push(home.join(".config").join(module_name).join("config.ini"));
        candidates.push(home.join(&file_name));
    }
    candidates.push(roots.system.join(&file_name));

    candidates
}

/// First existing candidate for `module_name`.
pub fn find_config(module_name: &str, roots: &SearchRoots) -> Option<PathBuf> {
    first_existing(candidate_paths(module_name, roots))
}

/// First path in `candidates` that is an existing file.
pub fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| is_file(path))
}

fn is_file(path: &Path) -> bool {
    path.metadata().is_ok_and(|meta| meta.is_file())
}
