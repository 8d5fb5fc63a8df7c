//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;

/// Serializes tests that touch the process-wide configuration.
static SINGLETON: Mutex<()> = Mutex::new(());

/// Take the singleton lock, recovering from a panicked holder.
#[allow(dead_code)]
pub fn singleton_guard() -> MutexGuard<'static, ()> {
    SINGLETON.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}
