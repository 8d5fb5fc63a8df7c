use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::ini::{IniDocument, SectionMap};
use super::search::{find_config, SearchRoots};
use crate::domain::errors::{ConfigError, ConfigResult};

const TRUE_TOKENS: [&str; 4] = ["1", "yes", "true", "on"];
const FALSE_TOKENS: [&str; 4] = ["0", "no", "false", "off"];

/// Read-only view over one resolved configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigHandle {
    module_name: String,
    source_path: Option<PathBuf>,
    document: IniDocument,
}

impl ConfigHandle {
    /// Resolve and parse the configuration for `module_name`.
    ///
    /// An explicit path is used whether or not it exists; a missing file gives
    /// an empty configuration. Without one, the standard search locations are
    /// tried and an empty configuration is returned when none exists.
    pub fn load(
        module_name: &str,
        explicit_path: Option<&Path>,
        defaults: Option<&HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        match explicit_path {
            Some(path) => Self::load_file(module_name, path, defaults),
            None => Self::discover(module_name, &SearchRoots::from_env(), defaults),
        }
    }

    /// Search `roots` for the configuration of `module_name`.
    pub fn discover(
        module_name: &str,
        roots: &SearchRoots,
        defaults: Option<&HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        match find_config(module_name, roots) {
            Some(path) => Self::load_file(module_name, &path, defaults),
            None => {
                debug!(module = module_name, "no configuration file found");
                Ok(Self::empty(module_name, defaults))
            }
        }
    }

    /// Parse the file at `path`; a missing file yields an empty configuration.
    pub fn load_file(
        module_name: &str,
        path: &Path,
        defaults: Option<&HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let document = match std::fs::read_to_string(path) {
            Ok(text) => IniDocument::parse(&text, defaults, Some(path))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(
                    module = module_name,
                    path = %path.display(),
                    "configuration file does not exist, using empty configuration"
                );
                IniDocument::with_defaults(defaults)
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        debug!(
            module = module_name,
            path = %path.display(),
            sections = document.sections().count(),
            "loaded configuration"
        );

        Ok(Self {
            module_name: module_name.to_string(),
            source_path: Some(path.to_path_buf()),
            document,
        })
    }

    /// Build a handle from INI text held in memory.
    pub fn from_ini_str(
        module_name: &str,
        text: &str,
        defaults: Option<&HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        Ok(Self {
            module_name: module_name.to_string(),
            source_path: None,
            document: IniDocument::parse(text, defaults, None)?,
        })
    }

    /// A handle with no source; every section lookup misses.
    pub fn empty(module_name: &str, defaults: Option<&HashMap<String, String>>) -> Self {
        Self {
            module_name: module_name.to_string(),
            source_path: None,
            document: IniDocument::with_defaults(defaults),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The file this handle was read from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.document.sections()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.document.has_section(section)
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.document.lookup(section, key).is_some()
    }

    pub fn defaults(&self) -> &SectionMap {
        self.document.defaults()
    }

    /// Keys written under `section` itself, uninterpolated.
    pub fn section_entries(&self, section: &str) -> Option<&SectionMap> {
        self.document.section(section)
    }

    /// Defaults overlaid by the keys of `section`, interpolated.
    pub fn entries(&self, section: &str) -> ConfigResult<Option<BTreeMap<String, String>>> {
        let Some(own) = self.document.section(section) else {
            return Ok(None);
        };
        let mut merged = BTreeMap::new();
        for (key, raw) in self.document.defaults().iter().chain(own) {
            merged.insert(key.clone(), raw.as_str());
        }
        merged
            .into_iter()
            .map(|(key, raw)| {
                let value = self.document.interpolate(section, &key, raw)?;
                Ok((key, value))
            })
            .collect::<ConfigResult<_>>()
            .map(Some)
    }

    /// Value of `key` without interpolation.
    pub fn get_raw(&self, section: &str, key: &str) -> Option<&str> {
        self.document.lookup(section, key)
    }

    /// Interpolated value of `key`; `None` when the section or key is missing.
    pub fn get_string(&self, section: &str, key: &str) -> ConfigResult<Option<String>> {
        self.get_raw(section, key)
            .map(|raw| self.document.interpolate(section, key, raw))
            .transpose()
    }

    pub fn get_string_or(&self, section: &str, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_string(section, key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Boolean value of `key`.
    ///
    /// Accepts `1/yes/true/on` and `0/no/false/off` in any case; any other
    /// present value is a [`ConfigError::Type`].
    pub fn get_bool(&self, section: &str, key: &str) -> ConfigResult<Option<bool>> {
        let Some(value) = self.get_string(section, key)? else {
            return Ok(None);
        };
        let token = value.trim().to_ascii_lowercase();
        if TRUE_TOKENS.contains(&token.as_str()) {
            Ok(Some(true))
        } else if FALSE_TOKENS.contains(&token.as_str()) {
            Ok(Some(false))
        } else {
            Err(type_error(section, key, value, "boolean"))
        }
    }

    pub fn get_bool_or(&self, section: &str, key: &str, default: bool) -> ConfigResult<bool> {
        Ok(self.get_bool(section, key)?.unwrap_or(default))
    }

    /// Base-10 integer value of `key`.
    pub fn get_int(&self, section: &str, key: &str) -> ConfigResult<Option<i64>> {
        let Some(value) = self.get_string(section, key)? else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| type_error(section, key, value, "integer"))
    }

    pub fn get_int_or(&self, section: &str, key: &str, default: i64) -> ConfigResult<i64> {
        Ok(self.get_int(section, key)?.unwrap_or(default))
    }

    pub(crate) fn document(&self) -> &IniDocument {
        &self.document
    }
}

fn type_error(section: &str, key: &str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::Type {
        section: section.to_string(),
        key: key.to_string(),
        value,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ini::DEFAULT_SECTION;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SAMPLE: &str = "[Flags]\n\
                          flag1 = True\n\
                          flag2 = 0\n\
                          [Numbers]\n\
                          int1 = 666\n\
                          neg = -12\n\
                          padded =  42 \n\
                          word = many\n";

    fn sample() -> ConfigHandle {
        ConfigHandle::from_ini_str("test", SAMPLE, None).unwrap()
    }

    #[test]
    fn test_get_bool_tokens() {
        let text = "[b]\nt1 = True\nt2 = true\nt3 = 1\nt4 = yes\nt5 = on\nt6 = YES\n\
                    f1 = False\nf2 = false\nf3 = 0\nf4 = no\nf5 = off\nf6 = Off\n\
                    bad = banana\n";
        let handle = ConfigHandle::from_ini_str("test", text, None).unwrap();

        for key in ["t1", "t2", "t3", "t4", "t5", "t6"] {
            assert_eq!(handle.get_bool("b", key).unwrap(), Some(true), "{key}");
        }
        for key in ["f1", "f2", "f3", "f4", "f5", "f6"] {
            assert_eq!(handle.get_bool("b", key).unwrap(), Some(false), "{key}");
        }

        let err = handle.get_bool("b", "bad").unwrap_err();
        match err {
            ConfigError::Type { value, expected, .. } => {
                assert_eq!(value, "banana");
                assert_eq!(expected, "boolean");
            }
            other => panic!("Expected Type error, got {other:?}"),
        }
        // a present-but-bad value is never replaced by the default
        assert!(handle.get_bool_or("b", "bad", true).is_err());
    }

    #[test]
    fn test_get_int() {
        let handle = sample();
        assert_eq!(handle.get_int("Numbers", "int1").unwrap(), Some(666));
        assert_eq!(handle.get_int("Numbers", "neg").unwrap(), Some(-12));
        assert_eq!(handle.get_int("Numbers", "padded").unwrap(), Some(42));
        assert!(matches!(
            handle.get_int("Numbers", "word"),
            Err(ConfigError::Type { expected: "integer", .. })
        ));
        assert_eq!(handle.get_int_or("Numbers", "absent", 7).unwrap(), 7);
    }

    #[test]
    fn test_missing_section_and_key_are_indistinguishable() {
        let handle = sample();

        assert_eq!(handle.get_string("Nope", "flag1").unwrap(), None);
        assert_eq!(handle.get_string("Flags", "nope").unwrap(), None);
        assert_eq!(handle.get_string_or("Nope", "x", "dflt").unwrap(), "dflt");
        assert_eq!(handle.get_string_or("Flags", "x", "dflt").unwrap(), "dflt");
        assert!(handle.get_bool_or("Nope", "x", true).unwrap());
        assert!(handle.get_bool_or("Flags", "x", true).unwrap());
        assert_eq!(handle.get_int_or("Nope", "x", 3).unwrap(), 3);
        assert_eq!(handle.get_int_or("Numbers", "x", 3).unwrap(), 3);
    }

    #[test]
    fn test_raw_vs_interpolated() {
        let handle = ConfigHandle::from_ini_str(
            "test",
            "[logging]\ndir = /var/log\nlogfile = %(dir)s/app.log\n\
             format = %(asctime)s %(message)s\n",
            None,
        )
        .unwrap();

        assert_eq!(
            handle.get_string("logging", "logfile").unwrap().as_deref(),
            Some("/var/log/app.log")
        );
        assert_eq!(
            handle.get_raw("logging", "logfile"),
            Some("%(dir)s/app.log")
        );
        assert_eq!(
            handle.get_raw("logging", "format"),
            Some("%(asctime)s %(message)s")
        );
        assert!(matches!(
            handle.get_string("logging", "format"),
            Err(ConfigError::Interpolation { .. })
        ));
    }

    #[test]
    fn test_defaults_visible_in_sections() {
        let defaults = HashMap::from([("console".to_string(), "off".to_string())]);
        let handle = ConfigHandle::from_ini_str("test", "[logging]\n", Some(&defaults)).unwrap();

        assert_eq!(handle.get_bool("logging", "console").unwrap(), Some(false));
        assert_eq!(
            handle.get_bool(DEFAULT_SECTION, "console").unwrap(),
            Some(false)
        );
        assert_eq!(handle.get_bool("other", "console").unwrap(), None);
        assert!(handle.has_option("logging", "console"));
        assert!(!handle.has_option("other", "console"));
    }

    #[test]
    fn test_entries_merge_defaults() {
        let handle = ConfigHandle::from_ini_str(
            "test",
            "[DEFAULT]\nbase = /srv\nmode = a\n[app]\nmode = b\ndata = %(base)s/data\n",
            None,
        )
        .unwrap();

        let entries = handle.entries("app").unwrap().unwrap();
        assert_eq!(entries.get("mode").map(String::as_str), Some("b"));
        assert_eq!(entries.get("base").map(String::as_str), Some("/srv"));
        assert_eq!(entries.get("data").map(String::as_str), Some("/srv/data"));

        let own = handle.section_entries("app").unwrap();
        assert_eq!(own.len(), 2);
        assert!(handle.entries("missing").unwrap().is_none());
    }

    #[test]
    fn test_load_file_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        file.flush().unwrap();

        let handle = ConfigHandle::load("test", Some(file.path()), None).unwrap();
        assert_eq!(handle.source_path(), Some(file.path()));
        assert_eq!(handle.module_name(), "test");
        assert_eq!(handle.get_bool("Flags", "flag1").unwrap(), Some(true));
        assert_eq!(handle.get_bool("Flags", "flag2").unwrap(), Some(false));
    }

    #[test]
    fn test_load_missing_explicit_path_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.ini");

        let handle = ConfigHandle::load("test", Some(&path), None).unwrap();
        assert_eq!(handle.source_path(), Some(path.as_path()));
        assert_eq!(handle.sections().count(), 0);
        assert_eq!(handle.get_string("any", "key").unwrap(), None);
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "no header here").unwrap();
        file.flush().unwrap();

        let err = ConfigHandle::load("test", Some(file.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_load_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigHandle::load("test", Some(dir.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_discover_without_candidates() {
        let dir = TempDir::new().unwrap();
        let roots = SearchRoots {
            cwd: dir.path().to_path_buf(),
            home: None,
            system: dir.path().join("etc"),
        };

        let handle = ConfigHandle::discover("nothing-here", &roots, None).unwrap();
        assert_eq!(handle.source_path(), None);
        assert!(!handle.has_section("logging"));
    }

    #[test]
    fn test_discover_picks_cwd_over_system() {
        let dir = TempDir::new().unwrap();
        let roots = SearchRoots {
            cwd: dir.path().join("cwd"),
            home: None,
            system: dir.path().join("etc"),
        };
        std::fs::create_dir_all(&roots.cwd).unwrap();
        std::fs::create_dir_all(&roots.system).unwrap();
        std::fs::write(roots.cwd.join("demo.ini"), "[where]\nis = cwd\n").unwrap();
        std::fs::write(roots.system.join("demo.ini"), "[where]\nis = etc\n").unwrap();

        let handle = ConfigHandle::discover("demo", &roots, None).unwrap();
        assert_eq!(handle.get_raw("where", "is"), Some("cwd"));
        assert_eq!(handle.source_path(), Some(roots.cwd.join("demo.ini").as_path()));
    }
}
