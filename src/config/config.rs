use std::path::Path;

use regex::Regex;

use crate::errors::errors::ConfigError;

/// File suffixes parsed when none are configured.
pub const DEFAULT_SUFFIXES: [&str; 5] = ["php", "php3", "php4", "php5", "inc"];

/// Which files a run reads and how doc comments are interpreted.
#[derive(Debug, Clone)]
pub struct Config {
    suffixes: Vec<String>,
    exclude: Vec<Regex>,
    ignore_annotations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
            ignore_annotations: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the suffix list. A leading dot is optional, matching is
    /// case-insensitive.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.suffixes = suffixes
            .into_iter()
            .map(|suffix| suffix.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|suffix| !suffix.is_empty())
            .collect();
        self
    }

    /// Adds exclude patterns, matched against the whole path.
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|source| {
                ConfigError::InvalidExcludePattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            self.exclude.push(regex);
        }
        Ok(self)
    }

    pub fn with_ignore_annotations(mut self, ignore: bool) -> Self {
        self.ignore_annotations = ignore;
        self
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn ignore_annotations(&self) -> bool {
        self.ignore_annotations
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.exclude.iter().any(|regex| regex.is_match(&path))
    }

    pub fn has_source_suffix(&self, path: &Path) -> bool {
        match path.extension() {
            Some(extension) => {
                let extension = extension.to_string_lossy().to_lowercase();
                self.suffixes.iter().any(|suffix| *suffix == extension)
            }
            None => false,
        }
    }

    /// True for files a run should parse.
    pub fn accepts(&self, path: &Path) -> bool {
        self.has_source_suffix(path) && !self.is_excluded(path)
    }
}
