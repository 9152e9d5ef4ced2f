//! Outcome of a move operation

use relocate_core::{PathMap, SpecifierEdit};
use relocate_foundation::{Diagnostic, RelocateError, RelocateResult};
use serde::Serialize;
use std::path::PathBuf;

/// A file whose specifiers were rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub path: PathBuf,
    pub rewrites: Vec<SpecifierEdit>,
}

/// A file that could not be read, parsed, written or moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, error: &RelocateError) -> Self {
        Self {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    /// Per-file plan, directories expanded
    pub path_map: PathMap,
    pub files_scanned: usize,
    pub files_changed: Vec<ChangedFile>,
    /// Total number of rewritten specifiers
    pub rewrites: usize,
    pub failures: Vec<FileFailure>,
    pub diagnostics: Vec<Diagnostic>,
    pub dry_run: bool,
}

impl MoveReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn to_json(&self) -> RelocateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
