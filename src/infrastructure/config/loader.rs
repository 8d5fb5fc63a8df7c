use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use super::handle::ConfigHandle;
use crate::domain::errors::ConfigResult;

static INSTANCE: Mutex<Option<Arc<ConfigHandle>>> = Mutex::new(None);

/// Process-wide configuration accessor
///
/// The first successful [`ConfigLoader::get_or_create`] call decides the
/// configuration for the whole process. Later calls get the same handle back
/// and their arguments are ignored. Code that does not need the global can
/// build a [`ConfigHandle`] directly and pass it around instead.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Return the process configuration, constructing it on first use.
    ///
    /// Construction runs under a lock, so concurrent first calls build the
    /// handle once. A failed construction leaves no instance behind.
    pub fn get_or_create(
        module_name: &str,
        explicit_path: Option<&Path>,
        defaults: Option<&HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigHandle>> {
        let mut slot = Self::slot();
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }

        let handle = Arc::new(ConfigHandle::load(module_name, explicit_path, defaults)?);
        info!(
            module = module_name,
            path = ?handle.source_path(),
            "configuration initialized"
        );
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// The process configuration, if it has been created.
    pub fn current() -> Option<Arc<ConfigHandle>> {
        Self::slot().clone()
    }

    /// Drop the process configuration so the next call rebuilds it.
    ///
    /// Handles already handed out stay valid.
    pub fn reset() {
        Self::slot().take();
    }

    fn slot() -> MutexGuard<'static, Option<Arc<ConfigHandle>>> {
        INSTANCE.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
