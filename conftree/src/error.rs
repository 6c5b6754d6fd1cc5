use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure the configuration tree can report.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    UnknownPath(#[from] UnknownPathError),

    #[error(transparent)]
    Render(#[from] TemplateRenderError),
}

/// The option schema is unreadable or structurally invalid.
///
/// These are fatal at process start; a schema that failed once will fail for
/// every request.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} schema: {reason}")]
    Parse { format: &'static str, reason: String },

    #[error("unsupported schema file extension: {0:?}")]
    UnsupportedFormat(String),

    #[error("option `{path}` has unknown type `{kind}`")]
    UnknownKind { path: String, kind: String },

    #[error("choice option `{path}` declares no choices")]
    MissingChoices { path: String },

    #[error("invalid option name {name:?} under `{parent}`")]
    InvalidName { parent: String, name: String },

    #[error("option `{path}` is declared more than once")]
    DuplicateName { path: String },

    #[error("option `{path}` has an invalid default: expected {expected}, got {actual}")]
    InvalidDefault {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("top-level option `{path}` cannot declare `when_parent_is`")]
    RootActivation { path: String },
}

/// A dotted path did not resolve to any option.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown option path: {path:?}")]
pub struct UnknownPathError {
    pub path: String,
}

impl UnknownPathError {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A template fragment could not be rendered; the whole document is dropped.
#[derive(Error, Debug)]
#[error("failed to render template {fragment:?} of `{path}`: {source}")]
pub struct TemplateRenderError {
    /// Path of the option that owns the fragment.
    pub path: String,
    /// The raw fragment text.
    pub fragment: String,
    #[source]
    pub source: FragmentError,
}

/// Problems found while parsing or evaluating a single fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("placeholder opened at byte {0} is never closed")]
    Unclosed(usize),

    #[error("control blocks are not supported, use `when_parent_is` instead")]
    UnsupportedBlock,

    #[error("expected data[\"<path>\"], found {0:?}")]
    InvalidExpression(String),

    #[error("no option named {0:?}")]
    UnknownKey(String),
}
