use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedEndOfStream => "UnexpectedEndOfStream",
            ErrorImpl::UnclosedBody { .. } => "UnclosedBody",
            ErrorImpl::InvalidFunctionSignature { .. } => "InvalidFunctionSignature",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedEndOfStream => {
                ErrorTip::Suggestion(String::from("The file ends in the middle of a statement"))
            }
            ErrorImpl::UnclosedBody { kind, name } => ErrorTip::Suggestion(format!(
                "Body of {} `{}` is missing its closing brace",
                kind, name
            )),
            ErrorImpl::InvalidFunctionSignature { name } => ErrorTip::Suggestion(format!(
                "Parameter list of `{}` is not terminated",
                name
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, line: {}, col: {}, file: {}.",
            self.internal_error, self.position.line, self.position.column, self.position.file
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("Unrecognised token: {token}")]
    UnrecognisedToken { token: String },
    #[error("Unexpected token: {token}")]
    UnexpectedToken { token: String },
    #[error("Unexpected end of token stream")]
    UnexpectedEndOfStream,
    #[error("Unclosed {kind} body: {name}")]
    UnclosedBody { kind: &'static str, name: String },
    #[error("Invalid function signature: {name}")]
    InvalidFunctionSignature { name: String },
}

/// Violations of the core's own bookkeeping. Raised with `panic!`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("no active scope in symbol table")]
    NoActiveScope,
    #[error("token stack popped while empty")]
    EmptyTokenStack,
    #[error("cannot build {kind} `{name}`, builder state is frozen")]
    BuilderFrozen { kind: &'static str, name: String },
}

/// Invalid run configuration, reported before any file is read.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("no such file or directory: {path}")]
    MissingPath { path: String },
}
