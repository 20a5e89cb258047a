//! Unit tests for the engine.

use std::fs;
use std::path::{Path, PathBuf};

use super::engine::Engine;
use crate::config::config::Config;
use crate::errors::errors::ConfigError;

/// Fresh scratch directory under the system temp dir.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("depend-engine-{}-{}", name, std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_collect_files_walks_directories() {
    let dir = scratch_dir("collect");
    write(&dir, "a/Foo.php", "<?php class Foo {}");
    write(&dir, "a/b/Bar.inc", "<?php class Bar {}");
    write(&dir, "a/notes.txt", "not code");
    write(&dir, "vendor/Lib.php", "<?php class Lib {}");

    let config = Config::new().with_exclude(["vendor"]).unwrap();
    let engine = Engine::new(config);
    let files = engine.collect_files(&[dir.clone()]).unwrap();

    let mut names: Vec<String> = files
        .iter()
        .map(|file| file.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Bar.inc", "Foo.php"]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_path_is_a_config_error() {
    let engine = Engine::new(Config::default());
    let error = engine
        .collect_files(&[PathBuf::from("/definitely/not/here.php")])
        .unwrap_err();

    assert!(matches!(error, ConfigError::MissingPath { .. }));
}

#[test]
fn test_run_continues_after_parse_error() {
    let dir = scratch_dir("run");
    write(&dir, "Good.php", "<?php\nnamespace App;\nclass Good {}\n");
    let broken = write(&dir, "Broken.php", "<?php\nclass Broken {\n");
    write(&dir, "Other.php", "<?php\nnamespace App;\nfunction helper() {}\n");

    let mut engine = Engine::new(Config::default());
    let report = engine.run(&[dir.clone()]).unwrap();

    assert_eq!(report.files, 3);
    assert!(report.has_parse_errors());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains(&broken.display().to_string()));

    let builder = engine.builder();
    let app = builder.find_namespace("App").unwrap();
    assert_eq!(builder.namespace(app).types().len(), 1);
    assert_eq!(builder.namespace(app).functions().len(), 1);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_run_without_errors() {
    let mut engine = Engine::new(Config::default());
    let report = engine.run(&[]).unwrap();

    assert_eq!(report.files, 0);
    assert!(!report.has_parse_errors());
}

#[test]
fn test_parse_source_honours_ignore_annotations() {
    let source = "<?php\n/** @package Tools */\nclass Hammer {}\n";

    let mut engine = Engine::new(Config::new().with_ignore_annotations(true));
    engine.parse_source(source, "Hammer.php").unwrap();
    assert!(engine.builder().find_namespace("Tools").is_none());

    let mut engine = Engine::new(Config::default());
    engine.parse_source(source, "Hammer.php").unwrap();
    assert!(engine.builder().find_namespace("Tools").is_some());
}

#[test]
fn test_unrecognised_character_is_reported() {
    let mut engine = Engine::new(Config::default());
    let error = engine.parse_source("<?php\n$a = 1 ` 2;\n", "Tick.php");

    assert!(error.is_err());
}
