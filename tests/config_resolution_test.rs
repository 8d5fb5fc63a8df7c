// Integration tests for configuration resolution and typed access

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use loxcommon::{ConfigError, ConfigHandle, ConfigLoader, SearchRoots};
use serde::Deserialize;

const TEST_INI: &str = "\
[Flags]
flag1 = True
flag2 = off

[Numbers]
int1 = 666
";

#[test]
fn test_singleton_with_explicit_path() {
    let _guard = common::singleton_guard();
    ConfigLoader::reset();

    let dir = common::temp_dir();
    let path = common::write_file(dir.path(), "test.ini", TEST_INI);

    let config = ConfigLoader::get_or_create("test", Some(&path), None).unwrap();

    assert_eq!(config.get_bool("Flags", "flag1").unwrap(), Some(true));
    assert_eq!(config.get_bool("Flags", "flag2").unwrap(), Some(false));
    assert_eq!(config.get_int("Numbers", "int1").unwrap(), Some(666));
    assert_eq!(config.source_path(), Some(path.as_path()));

    ConfigLoader::reset();
}

#[test]
fn test_first_call_wins() {
    let _guard = common::singleton_guard();
    ConfigLoader::reset();

    let dir = common::temp_dir();
    let first = common::write_file(dir.path(), "first.ini", "[Numbers]\nint1 = 1\n");
    let second = common::write_file(dir.path(), "second.ini", "[Numbers]\nint1 = 2\n");

    let a = ConfigLoader::get_or_create("first", Some(&first), None).unwrap();
    let b = ConfigLoader::get_or_create("second", Some(&second), None).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(b.module_name(), "first");
    assert_eq!(b.get_int("Numbers", "int1").unwrap(), Some(1));
    assert!(ConfigLoader::current().is_some_and(|c| Arc::ptr_eq(&c, &a)));

    ConfigLoader::reset();
    assert!(ConfigLoader::current().is_none());
}

#[test]
fn test_malformed_file_leaves_no_instance() {
    let _guard = common::singleton_guard();
    ConfigLoader::reset();

    let dir = common::temp_dir();
    let path = common::write_file(dir.path(), "broken.ini", "[ok]\na = 1\n[broken\n");

    let err = ConfigLoader::get_or_create("broken", Some(&path), None).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { line: 3, .. }));
    assert!(ConfigLoader::current().is_none());
}

#[test]
fn test_missing_section_and_missing_key_fall_back() {
    let config = ConfigHandle::from_ini_str("test", TEST_INI, None).unwrap();

    assert_eq!(config.get_int_or("Nowhere", "int1", 42).unwrap(), 42);
    assert_eq!(config.get_int_or("Numbers", "int2", 42).unwrap(), 42);
    assert!(config.get_bool_or("Nowhere", "flag1", true).unwrap());
    assert_eq!(
        config.get_string_or("Flags", "missing", "fallback").unwrap(),
        "fallback"
    );
}

#[test]
fn test_bad_values_are_type_errors() {
    let config =
        ConfigHandle::from_ini_str("test", "[Flags]\nflag = banana\n[Numbers]\nn = 12abc\n", None)
            .unwrap();

    assert!(matches!(
        config.get_bool_or("Flags", "flag", false),
        Err(ConfigError::Type { expected: "boolean", .. })
    ));
    assert!(matches!(
        config.get_int("Numbers", "n"),
        Err(ConfigError::Type { expected: "integer", .. })
    ));
}

#[test]
fn test_missing_explicit_path_is_empty() {
    let dir = common::temp_dir();
    let path = dir.path().join("absent.ini");

    let config = ConfigHandle::load("absent", Some(&path), None).unwrap();

    assert_eq!(config.sections().count(), 0);
    assert_eq!(config.source_path(), Some(path.as_path()));
    assert_eq!(config.get_string("any", "key").unwrap(), None);
}

#[test]
fn test_discovery_prefers_working_directory() {
    let cwd = common::temp_dir();
    let home = common::temp_dir();
    let system = common::temp_dir();
    common::write_file(cwd.path(), "svc.ini", "[where]\nfrom = cwd\n");
    common::write_file(home.path(), ".config/svc/config.ini", "[where]\nfrom = xdg\n");
    common::write_file(system.path(), "svc.ini", "[where]\nfrom = system\n");

    let mut roots = SearchRoots {
        cwd: cwd.path().to_path_buf(),
        home: Some(home.path().to_path_buf()),
        system: system.path().to_path_buf(),
    };
    let config = ConfigHandle::discover("svc", &roots, None).unwrap();
    assert_eq!(config.get_string("where", "from").unwrap().as_deref(), Some("cwd"));

    roots.cwd = common::temp_dir().path().to_path_buf();
    let config = ConfigHandle::discover("svc", &roots, None).unwrap();
    assert_eq!(config.get_string("where", "from").unwrap().as_deref(), Some("xdg"));

    roots.home = None;
    let config = ConfigHandle::discover("svc", &roots, None).unwrap();
    assert_eq!(config.get_string("where", "from").unwrap().as_deref(), Some("system"));
}

#[test]
fn test_discovery_through_home_directory() {
    let home = common::temp_dir();
    common::write_file(
        home.path(),
        "loxcommon_itest_home.ini",
        "[where]\nfrom = home\n",
    );

    temp_env::with_var("HOME", Some(home.path()), || {
        let config = ConfigHandle::load("loxcommon_itest_home", None, None).unwrap();
        assert_eq!(config.get_string("where", "from").unwrap().as_deref(), Some("home"));
    });
}

#[test]
fn test_defaults_and_interpolation() {
    let defaults = HashMap::from([
        ("base".to_string(), "/srv/app".to_string()),
        ("debug".to_string(), "no".to_string()),
    ]);
    let config = ConfigHandle::from_ini_str(
        "app",
        "[paths]\ndata = %(base)s/data\nratio = 50%%\n[flags]\ndebug = yes\n",
        Some(&defaults),
    )
    .unwrap();

    assert_eq!(
        config.get_string("paths", "data").unwrap().as_deref(),
        Some("/srv/app/data")
    );
    assert_eq!(config.get_string("paths", "ratio").unwrap().as_deref(), Some("50%"));
    assert_eq!(config.get_bool("paths", "debug").unwrap(), Some(false));
    assert_eq!(config.get_bool("flags", "debug").unwrap(), Some(true));
    assert_eq!(config.get_raw("paths", "data"), Some("%(base)s/data"));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Numbers {
    int1: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Whole {
    #[serde(rename = "Numbers")]
    numbers: Numbers,
}

#[test]
fn test_typed_extraction() {
    let config = ConfigHandle::from_ini_str("test", TEST_INI, None).unwrap();

    let numbers: Numbers = config.extract_section("Numbers").unwrap();
    assert_eq!(numbers, Numbers { int1: 666 });

    let whole: Whole = config.extract().unwrap();
    assert_eq!(whole.numbers.int1, 666);

    assert!(matches!(
        config.extract_section::<Numbers>("Flags"),
        Err(ConfigError::Extract { .. })
    ));
}
