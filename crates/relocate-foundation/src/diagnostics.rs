//! Diagnostics channel for non-fatal findings
//!
//! The resolver and the literal classifier never fail a move because of a
//! single odd specifier. They report what they skipped here and carry on.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// How loud a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// What kind of thing was skipped or approximated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A relative specifier that does not point at an existing file
    UnresolvedImport,
    /// An import-like argument that is not a plain string or static template
    UnsupportedLiteral,
    /// No `package.json` above the working directory
    ProjectRootFallback,
}

/// 1-based position inside a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single non-fatal finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            file: file.into(),
            location: None,
            message: message.into(),
        }
    }

    pub fn info(kind: DiagnosticKind, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind,
            file: file.into(),
            location: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}:{}: {}", self.file.display(), loc, self.message),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}

/// Receiver of diagnostics. Never fails, never aborts.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let location = diagnostic
            .location
            .map(|l| l.to_string())
            .unwrap_or_default();
        match diagnostic.severity {
            Severity::Warning => warn!(
                file = %diagnostic.file.display(),
                location = %location,
                kind = ?diagnostic.kind,
                "{}",
                diagnostic.message
            ),
            Severity::Info => info!(
                file = %diagnostic.file.display(),
                kind = ?diagnostic.kind,
                "{}",
                diagnostic.message
            ),
        }
    }
}

/// Keeps diagnostics for the final report, optionally echoing them to tracing
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    echo: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect and also log through `TracingSink`
    pub fn echoing() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            echo: true,
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Diagnostics reported for one file, in reporting order
    pub fn for_file(&self, file: &Path) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.iter().filter(|x| x.file == file).cloned().collect())
            .unwrap_or_default()
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|mut d| std::mem::take(&mut *d))
            .unwrap_or_default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if self.echo {
            TracingSink.report(diagnostic.clone());
        }
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }
}
