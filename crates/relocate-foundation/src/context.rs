//! Explicit project context
//!
//! Every top-level operation receives one of these instead of looking up the
//! working directory or environment on its own.

use crate::paths::{absolutize, has_extension_in, normalize_path};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Source extensions understood by default, in probe order
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "es", "es6", "ts", "tsx"];

/// Directories never descended into, neither for enumeration nor expansion
pub const IGNORED_DIRECTORIES: &[&str] = &["node_modules", ".git", ".hg"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectContext {
    /// Directory whose files are scanned for references
    pub root: PathBuf,
    /// Directory user-supplied relative paths are resolved against
    pub cwd: PathBuf,
    /// Supported source extensions without the dot, in probe order
    pub extensions: Vec<String>,
    /// Gitignore-syntax patterns, relative to `root`
    pub ignore_patterns: Vec<String>,
}

impl ProjectContext {
    /// Context rooted at `root` using it as working directory as well
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = normalize_path(&root.into());
        Self {
            cwd: root.clone(),
            root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_patterns: Vec::new(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = normalize_path(&cwd.into());
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_ignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Absolute form of a user supplied path
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        absolutize(&self.cwd, path.as_ref())
    }

    /// Whether `path` carries one of the supported source extensions
    pub fn is_source_file(&self, path: &Path) -> bool {
        has_extension_in(path, &self.extensions)
    }

    /// Whether a bare extension (no dot) is a supported source extension
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}
