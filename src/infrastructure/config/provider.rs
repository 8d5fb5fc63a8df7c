//! Typed extraction through figment
//!
//! A [`ConfigHandle`] is a figment [`Provider`]: every section becomes a
//! dictionary of interpolated string values. Extraction is lossy, so
//! `"666"` deserializes into integer fields and `"true"` into booleans.

use figment::value::{Dict, Map, Value};
use figment::{Error, Figment, Metadata, Profile, Provider};
use serde::de::DeserializeOwned;

use super::handle::ConfigHandle;
use super::ini::SectionMap;
use crate::domain::errors::{ConfigError, ConfigResult};

impl ConfigHandle {
    /// Deserialize the whole configuration, one field per section.
    pub fn extract<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        Figment::from(self)
            .extract_lossy()
            .map_err(|source| ConfigError::Extract {
                target: self.module_name().to_string(),
                source: Box::new(source),
            })
    }

    /// Deserialize a single section.
    pub fn extract_section<T: DeserializeOwned>(&self, section: &str) -> ConfigResult<T> {
        Figment::from(SectionProvider {
            handle: self,
            section,
        })
        .extract_lossy()
        .map_err(|source| ConfigError::Extract {
            target: format!("[{section}]"),
            source: Box::new(source),
        })
    }

    fn section_dict(&self, section: &str) -> Result<Dict, Error> {
        let mut dict = Dict::new();
        if let Some(entries) = self.entries(section).map_err(|e| Error::from(e.to_string()))? {
            for (key, value) in entries {
                dict.insert(key, Value::from(value));
            }
        }
        Ok(dict)
    }

    fn metadata_name(&self) -> String {
        self.source_path().map_or_else(
            || format!("{} configuration", self.module_name()),
            |path| format!("INI file {}", path.display()),
        )
    }
}

impl Provider for ConfigHandle {
    fn metadata(&self) -> Metadata {
        Metadata::named(self.metadata_name())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut root = Dict::new();
        for section in self.sections() {
            root.insert(section.to_string(), Value::from(self.section_dict(section)?));
        }
        if !self.defaults().is_empty() {
            root.insert(
                super::ini::DEFAULT_SECTION.to_string(),
                Value::from(string_dict(self.defaults())),
            );
        }
        Ok(Profile::Default.collect(root))
    }
}

/// One section of a handle, exposed at the top level.
struct SectionProvider<'a> {
    handle: &'a ConfigHandle,
    section: &'a str,
}

impl Provider for SectionProvider<'_> {
    fn metadata(&self) -> Metadata {
        Metadata::named(format!("[{}] of {}", self.section, self.handle.metadata_name()))
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        Ok(Profile::Default.collect(self.handle.section_dict(self.section)?))
    }
}

fn string_dict(map: &SectionMap) -> Dict {
    map.iter()
        .map(|(key, value)| (key.clone(), Value::from(value.clone())))
        .collect()
}
