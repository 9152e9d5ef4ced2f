//! Resolving a relative specifier to the file it designates

use relocate_foundation::paths::{has_extension_in, normalize_path};
use relocate_foundation::{Diagnostic, DiagnosticKind, DiagnosticSink, ProjectContext};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::path_style::INDEX_BASENAME;

/// Filesystem-resolution collaborator.
///
/// Given the naive absolute location of a specifier, returns the concrete
/// source file a module loader would pick, or `None`.
#[cfg_attr(test, mockall::automock)]
pub trait ModuleProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Option<PathBuf>;
}

/// Probe backed by the real filesystem.
///
/// Tries, in order: the literal path, the path with each supported extension
/// appended, and `index.<ext>` inside the path treated as a directory. Only
/// files with a supported extension are candidates.
#[derive(Debug, Clone)]
pub struct FsProbe {
    extensions: Vec<String>,
}

impl FsProbe {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_context(ctx: &ProjectContext) -> Self {
        Self::new(ctx.extensions.iter().cloned())
    }

    fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
        let mut raw = OsString::from(path.as_os_str());
        raw.push(".");
        raw.push(ext);
        PathBuf::from(raw)
    }
}

impl ModuleProbe for FsProbe {
    fn probe(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() && has_extension_in(path, &self.extensions) {
            return Some(path.to_path_buf());
        }

        if let Some(found) = self
            .extensions
            .iter()
            .map(|ext| Self::with_appended_extension(path, ext))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }

        if path.is_dir() {
            return self
                .extensions
                .iter()
                .map(|ext| path.join(format!("{INDEX_BASENAME}.{ext}")))
                .find(|candidate| candidate.is_file());
        }

        None
    }
}

/// A specifier that does not point at an existing source file
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("File \"{}\" is importing \"{specifier}\" but it does not exist.", referencing_file.display())]
pub struct UnresolvedImport {
    pub referencing_file: PathBuf,
    pub specifier: String,
    /// The naive absolute join, used when resolution fails
    pub best_guess: PathBuf,
}

/// Module resolver: specifier + referencing file -> absolute file path
pub struct ModuleResolver<P = FsProbe> {
    probe: P,
    sink: Arc<dyn DiagnosticSink>,
}

impl<P: ModuleProbe> ModuleResolver<P> {
    pub fn new(probe: P, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { probe, sink }
    }

    /// Absolute join of the referencing file's directory and the specifier
    pub fn naive_path(referencing_file: &Path, specifier: &str) -> PathBuf {
        let dir = referencing_file.parent().unwrap_or(referencing_file);
        normalize_path(&dir.join(specifier))
    }

    pub fn try_resolve(
        &self,
        referencing_file: &Path,
        specifier: &str,
    ) -> Result<PathBuf, UnresolvedImport> {
        let naive = Self::naive_path(referencing_file, specifier);
        self.probe
            .probe(&naive)
            .map(|found| normalize_path(&found))
            .ok_or_else(|| UnresolvedImport {
                referencing_file: referencing_file.to_path_buf(),
                specifier: specifier.to_string(),
                best_guess: naive,
            })
    }

    /// Resolve, reporting a warning and falling back to the naive join when
    /// the target does not exist.
    pub fn resolve(&self, referencing_file: &Path, specifier: &str) -> PathBuf {
        match self.try_resolve(referencing_file, specifier) {
            Ok(resolved) => resolved,
            Err(unresolved) => {
                self.sink.report(Diagnostic::warning(
                    DiagnosticKind::UnresolvedImport,
                    referencing_file,
                    unresolved.to_string(),
                ));
                unresolved.best_guess
            }
        }
    }

    /// Like `resolve`, but a miss is only debug-logged. Used for files that
    /// are scanned as plain text, where quoted paths are often not modules.
    pub fn resolve_quietly(&self, referencing_file: &Path, specifier: &str) -> PathBuf {
        self.try_resolve(referencing_file, specifier)
            .unwrap_or_else(|unresolved| {
                debug!(
                    file = %referencing_file.display(),
                    specifier = %specifier,
                    "Could not resolve quoted path, using its literal location"
                );
                unresolved.best_guess
            })
    }
}
