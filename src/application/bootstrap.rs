use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::infrastructure::config::{ConfigHandle, ConfigLoader};
use crate::infrastructure::logging::{prepare_logging, PipelineOptions};

/// Startup settings for an application using this crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Name used to search for `<module_name>.ini`.
    pub module_name: String,

    /// Configuration file to use instead of searching.
    pub config_path: Option<PathBuf>,

    /// Seed values for the `DEFAULT` section.
    pub defaults: Option<HashMap<String, String>>,

    pub pipeline: PipelineOptions,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

impl BootstrapOptions {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            config_path: None,
            defaults: None,
            pipeline: PipelineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: HashMap<String, String>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: PipelineOptions) -> Self {
        self.pipeline = pipeline;
        self
    }
}

/// Resolve the process configuration, then configure logging from it.
///
/// The configuration becomes the process-wide instance. If one already
/// exists it is reused and the path and defaults in `options` are ignored.
pub fn init(options: &BootstrapOptions) -> Result<Arc<ConfigHandle>> {
    let config = ConfigLoader::get_or_create(
        &options.module_name,
        options.config_path.as_deref(),
        options.defaults.as_ref(),
    )
    .with_context(|| format!("Failed to load configuration for {}", options.module_name))?;

    prepare_logging(Some(&config), &options.pipeline)
        .with_context(|| format!("Failed to prepare logging for {}", options.module_name))?;

    debug!(
        module = %options.module_name,
        path = ?config.source_path(),
        "bootstrap complete"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Severity;

    #[test]
    fn test_default_options() {
        let options = BootstrapOptions::default();
        assert_eq!(options.module_name, "loxcommon");
        assert_eq!(options.config_path, None);
        assert_eq!(options.defaults, None);
        assert_eq!(options.pipeline, PipelineOptions::default());
    }

    #[test]
    fn test_builder() {
        let options = BootstrapOptions::new("myapp")
            .with_config_path("/etc/myapp.ini")
            .with_defaults(HashMap::from([("console".to_string(), "off".to_string())]))
            .with_pipeline(PipelineOptions::default().with_default_level(Severity::Debug));

        assert_eq!(options.module_name, "myapp");
        assert_eq!(options.config_path, Some(PathBuf::from("/etc/myapp.ini")));
        assert_eq!(
            options.defaults.as_ref().and_then(|d| d.get("console")).map(String::as_str),
            Some("off")
        );
        assert_eq!(options.pipeline.default_level, Severity::Debug);
    }
}
