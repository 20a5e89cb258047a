//! Unit tests for run configuration.

use std::path::Path;

use super::config::{Config, DEFAULT_SUFFIXES};
use crate::errors::errors::ConfigError;

#[test]
fn test_default_suffixes() {
    let config = Config::default();

    assert_eq!(config.suffixes().len(), DEFAULT_SUFFIXES.len());
    assert!(config.accepts(Path::new("src/Foo.php")));
    assert!(config.accepts(Path::new("lib/legacy.INC")));
    assert!(!config.accepts(Path::new("README.md")));
    assert!(!config.accepts(Path::new("Makefile")));
    assert!(!config.ignore_annotations());
}

#[test]
fn test_custom_suffixes() {
    let config = Config::new().with_suffixes([".phtml", "PHP"]);

    assert_eq!(config.suffixes(), &["phtml", "php"]);
    assert!(config.accepts(Path::new("view.phtml")));
    assert!(!config.accepts(Path::new("old.php5")));
}

#[test]
fn test_exclude_patterns() {
    let config = Config::new().with_exclude(["/vendor/", r"Test\.php$"]).unwrap();

    assert!(config.is_excluded(Path::new("app/vendor/lib/A.php")));
    assert!(config.is_excluded(Path::new("app/FooTest.php")));
    assert!(!config.accepts(Path::new("app/FooTest.php")));
    assert!(config.accepts(Path::new("app/Foo.php")));
}

#[test]
fn test_invalid_exclude_pattern() {
    let error = Config::new().with_exclude(["[unclosed"]).unwrap_err();

    assert!(matches!(
        error,
        ConfigError::InvalidExcludePattern { ref pattern, .. } if pattern == "[unclosed"
    ));
}

#[test]
fn test_ignore_annotations() {
    assert!(Config::new().with_ignore_annotations(true).ignore_annotations());
}
