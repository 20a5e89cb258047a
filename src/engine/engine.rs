use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    builder::builder::BuildContext,
    config::config::Config,
    display_error,
    errors::errors::{ConfigError, Error},
    lexer::stream::TokenStream,
    parser::parser::parse,
};

/// Outcome of one run over a file set.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of files handed to the parser.
    pub files: usize,
    /// One diagnostic per file that could not be read or parsed.
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn has_parse_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Engine {
    config: Config,
    builder: BuildContext,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine {
            config,
            builder: BuildContext::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn builder(&self) -> &BuildContext {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut BuildContext {
        &mut self.builder
    }

    pub fn into_builder(self) -> BuildContext {
        self.builder
    }

    /// Expands `paths` into the sorted list of files to parse. Directories are
    /// walked recursively and filtered by suffix and exclude patterns; files
    /// named explicitly are only checked against the exclude patterns.
    pub fn collect_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                if let Err(error) = self.collect_directory(path, &mut files) {
                    warn!(target: "engine", path = %path.display(), %error, "cannot scan directory");
                }
            } else if path.is_file() {
                if !self.config.is_excluded(path) {
                    files.push(path.clone());
                }
            } else {
                return Err(ConfigError::MissingPath {
                    path: path.display().to_string(),
                });
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn collect_directory(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), io::Error> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if self.config.is_excluded(&path) {
                continue;
            }
            if path.is_dir() {
                self.collect_directory(&path, out)?;
            } else if self.config.has_source_suffix(&path) {
                out.push(path);
            }
        }
        Ok(())
    }

    /// Parses every file below `paths`. A file that fails to read or parse is
    /// reported and skipped; declarations from the other files are kept.
    pub fn run(&mut self, paths: &[PathBuf]) -> Result<RunReport, ConfigError> {
        let files = self.collect_files(paths)?;
        info!(target: "engine", files = files.len(), "starting run");

        let mut report = RunReport::default();
        for file in &files {
            report.files += 1;
            if let Some(diagnostic) = self.process_file(file) {
                report.errors.push(diagnostic);
            }
        }

        debug!(
            target: "engine",
            files = report.files,
            errors = report.errors.len(),
            types = self.builder.types().len(),
            callables = self.builder.callables().len(),
            "finished run"
        );
        Ok(report)
    }

    fn process_file(&mut self, file: &Path) -> Option<String> {
        let name = file.display().to_string();
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(error) => {
                warn!(target: "engine", file = %name, %error, "cannot read file");
                return Some(format!("cannot read {}: {}", name, error));
            }
        };

        match self.parse_source(&source, &name) {
            Ok(()) => None,
            Err(error) => {
                warn!(target: "engine", file = %name, %error, "skipping file");
                Some(format!("{}\n{}", error, display_error(&error, &source)))
            }
        }
    }

    /// Tokenizes and parses one source text into the shared context.
    pub fn parse_source(&mut self, source: &str, file: &str) -> Result<(), Error> {
        let stream = TokenStream::from_source(source, file)?;
        parse(
            Box::new(stream),
            &mut self.builder,
            self.config.ignore_annotations(),
        )
    }
}
