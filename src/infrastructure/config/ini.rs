//! INI document parsing and `%(name)s` interpolation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::domain::errors::{ConfigError, ConfigResult};

/// Section whose keys act as fallbacks for every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Keys of one section, in sorted order.
pub type SectionMap = BTreeMap<String, String>;

/// A parsed INI source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    defaults: SectionMap,
    sections: BTreeMap<String, SectionMap>,
}

enum Target {
    Defaults,
    Section(String),
}

impl IniDocument {
    /// An empty document carrying only `defaults`.
    pub fn with_defaults(defaults: Option<&HashMap<String, String>>) -> Self {
        Self {
            defaults: defaults
                .map(|d| d.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
            sections: BTreeMap::new(),
        }
    }

    /// Parse `text`, seeding the `DEFAULT` section with `defaults` first.
    ///
    /// `path` only feeds error messages.
    pub fn parse(
        text: &str,
        defaults: Option<&HashMap<String, String>>,
        path: Option<&Path>,
    ) -> ConfigResult<Self> {
        let mut doc = Self::with_defaults(defaults);
        let mut target: Option<Target> = None;
        let mut last_key: Option<String> = None;
        let mut seen_sections: HashSet<String> = HashSet::new();
        let mut file_default_keys: HashSet<String> = HashSet::new();

        let parse_error = |line: usize, message: String| ConfigError::Parse {
            path: path.map(Path::to_path_buf),
            line,
            message,
        };

        for (index, line) in text.lines().enumerate() {
            let lineno = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = line.starts_with(|c: char| c.is_whitespace());
            if indented {
                if let (Some(key), Some(current)) = (&last_key, &target) {
                    let map = doc.target_map(current);
                    if let Some(value) = map.get_mut(key) {
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| parse_error(lineno, "unterminated section header".into()))?
                    .trim();
                if name.is_empty() {
                    return Err(parse_error(lineno, "empty section name".into()));
                }
                if !seen_sections.insert(name.to_string()) {
                    return Err(parse_error(lineno, format!("duplicate section [{name}]")));
                }
                target = Some(if name == DEFAULT_SECTION {
                    Target::Defaults
                } else {
                    doc.sections.insert(name.to_string(), SectionMap::new());
                    Target::Section(name.to_string())
                });
                last_key = None;
                continue;
            }

            let Some(delimiter) = trimmed.find(['=', ':']) else {
                return Err(parse_error(
                    lineno,
                    format!("expected `key = value`, found {trimmed:?}"),
                ));
            };
            let key = trimmed[..delimiter].trim();
            let value = trimmed[delimiter + 1..].trim();
            if key.is_empty() {
                return Err(parse_error(lineno, "empty option name".into()));
            }

            let Some(current) = &target else {
                return Err(parse_error(
                    lineno,
                    format!("option {key:?} appears before any section header"),
                ));
            };

            let duplicate = match current {
                Target::Defaults => !file_default_keys.insert(key.to_string()),
                Target::Section(name) => doc
                    .sections
                    .get(name)
                    .is_some_and(|section| section.contains_key(key)),
            };
            if duplicate {
                return Err(parse_error(lineno, format!("duplicate option {key:?}")));
            }

            doc.target_map(current)
                .insert(key.to_string(), value.to_string());
            last_key = Some(key.to_string());
        }

        Ok(doc)
    }

    fn target_map(&mut self, target: &Target) -> &mut SectionMap {
        match target {
            Target::Defaults => &mut self.defaults,
            Target::Section(name) => self.sections.entry(name.clone()).or_default(),
        }
    }

    pub fn defaults(&self) -> &SectionMap {
        &self.defaults
    }

    /// Names of the regular sections; `DEFAULT` is not listed.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Keys defined directly under `section`, without defaults.
    pub fn section(&self, section: &str) -> Option<&SectionMap> {
        if section == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections.get(section)
    }

    /// Raw value of `key`, falling back to defaults.
    ///
    /// A missing section yields `None` even when the defaults hold `key`.
    pub fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        if section == DEFAULT_SECTION {
            return self.defaults.get(key).map(String::as_str);
        }
        let own = self.sections.get(section)?;
        own.get(key)
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    /// Expand `%(name)s` references and `%%` escapes in `value`.
    ///
    /// References resolve against `section` and the defaults.
    pub fn interpolate(&self, section: &str, key: &str, value: &str) -> ConfigResult<String> {
        let mut out = String::with_capacity(value.len());
        self.expand_into(section, key, value, 1, &mut out)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        section: &str,
        key: &str,
        value: &str,
        depth: usize,
        out: &mut String,
    ) -> ConfigResult<()> {
        let interpolation_error = |reason: String| ConfigError::Interpolation {
            section: section.to_string(),
            key: key.to_string(),
            reason,
        };

        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(interpolation_error(format!(
                "recursion limit of {MAX_INTERPOLATION_DEPTH} exceeded"
            )));
        }

        let mut rest = value;
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            if let Some(after) = tail.strip_prefix('%') {
                out.push('%');
                rest = after;
            } else if let Some(after) = tail.strip_prefix('(') {
                let close = after.find(")s").ok_or_else(|| {
                    interpolation_error(format!("bad variable reference in {value:?}"))
                })?;
                let name = &after[..close];
                let referenced = self.lookup(section, name).ok_or_else(|| {
                    interpolation_error(format!("referenced option {name:?} not found"))
                })?;
                if referenced.contains('%') {
                    self.expand_into(section, key, referenced, depth + 1, out)?;
                } else {
                    out.push_str(referenced);
                }
                rest = &after[close + 2..];
            } else {
                return Err(interpolation_error(
                    "'%' must be followed by '%' or '('".to_string(),
                ));
            }
        }
        out.push_str(rest);
        Ok(())
    }
}
