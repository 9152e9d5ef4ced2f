//! Error handling for relocate
//!
//! Validation errors are fatal and reported before anything is rewritten or
//! moved. Everything else that can go wrong for a single file surfaces as a
//! `RelocateError` attached to that file, so the rest of the batch proceeds.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal pre-flight failures of a move request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("At least one source path and a target path are required")]
    MissingPaths,

    #[error("Source \"{}\" does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Target \"{}\" already exists", path.display())]
    TargetExists { path: PathBuf },

    #[error(
        "Multiple source paths were provided but \"{}\" does not exist",
        path.display()
    )]
    TargetMissing { path: PathBuf },

    #[error(
        "Multiple source paths were provided but \"{}\" is not a folder",
        path.display()
    )]
    TargetNotDirectory { path: PathBuf },

    #[error(
        "Cannot move \"{}\" into itself (\"{}\")",
        source_path.display(),
        target.display()
    )]
    TargetInsideSource { source_path: PathBuf, target: PathBuf },

    #[error(
        "Sources \"{}\" and \"{}\" would both be moved to \"{}\"",
        first.display(),
        second.display(),
        target.display()
    )]
    DuplicateDestination {
        first: PathBuf,
        second: PathBuf,
        target: PathBuf,
    },
}

/// Core error type used throughout relocate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelocateError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Parse error in {}: {message}", file.display())]
    Parse {
        message: String,
        file: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RelocateError {
    /// Create an I/O error bound to the file it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::Io {
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Create an I/O error that has no underlying `std::io::Error`
    pub fn io_message(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self::Io {
            message: format!("{}: {}", path.display(), message.into()),
            path: Some(path),
            source: None,
        }
    }

    /// Create a parse error without position information
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file: file.into(),
            line: None,
            column: None,
        }
    }

    /// Create a parse error pointing at a 1-based line and column
    pub fn parse_at(
        file: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            file: file.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Validation failures abort the whole operation; every other error is
    /// scoped to a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config { .. })
    }

    /// Path of the file this error is attached to, if any
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } => path.as_deref(),
            Self::Parse { file, .. } => Some(file),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RelocateError {
    fn from(err: std::io::Error) -> Self {
        RelocateError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

/// Result type alias for convenience
pub type RelocateResult<T> = Result<T, RelocateError>;
