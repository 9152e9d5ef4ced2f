//! Foundation Layer - Core types shared by every relocate crate
//!
//! This crate provides the building blocks the engine and its collaborators
//! agree on:
//! - The error taxonomy (`RelocateError`, `ValidationError`)
//! - The diagnostics channel (`Diagnostic`, `DiagnosticSink`)
//! - The explicit project context passed to every top-level operation
//! - Lexical path helpers that mirror how import specifiers are joined

pub mod context;
pub mod diagnostics;
pub mod error;
pub mod paths;

// Re-export commonly used types for convenience
pub use context::{ProjectContext, DEFAULT_EXTENSIONS, IGNORED_DIRECTORIES};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, Severity, SourceLocation,
    TracingSink,
};
pub use error::{RelocateError, RelocateResult, ValidationError};
