//! Seam between the decision engine and the code that finds specifiers
//!
//! A `SpecifierRewriter` locates every literal that carries a module path in
//! one file, asks the updater for its new text and splices the results back
//! into the original source. Only the literals themselves change; comments,
//! whitespace and everything else stay byte for byte.

use relocate_foundation::{DiagnosticSink, RelocateError, RelocateResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Quote character used when a string literal is rewritten
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// Keep whatever quote the literal had
    #[default]
    Preserve,
    Single,
    Double,
}

impl QuoteStyle {
    /// Render `value` as a literal, given the quote the original used.
    ///
    /// Template literals keep their backticks regardless of the style.
    pub fn quote(self, original: char, value: &str) -> String {
        let quote = match (original, self) {
            ('`', _) | (_, QuoteStyle::Preserve) => original,
            (_, QuoteStyle::Single) => '\'',
            (_, QuoteStyle::Double) => '"',
        };
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for c in value.chars() {
            if c == quote || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(quote);
        out
    }
}

impl std::str::FromStr for QuoteStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            other => Err(format!("unknown quote style '{other}'")),
        }
    }
}

/// One literal replaced in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecifierEdit {
    /// Byte range of the whole literal, quotes included
    #[serde(skip)]
    pub range: Range<usize>,
    pub line: usize,
    pub old_specifier: String,
    pub new_specifier: String,
    /// Literal text written in place of `range`
    #[serde(skip)]
    pub replacement: String,
}

/// Result of running a rewriter over one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRewrite {
    pub content: String,
    pub edits: Vec<SpecifierEdit>,
}

impl FileRewrite {
    pub fn unchanged(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            edits: Vec::new(),
        }
    }

    pub fn is_changed(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Locates rewritable specifiers in one kind of file.
///
/// `update` is the updater bound to the file under scan: it receives the
/// specifier text and returns what it should become (possibly the same).
pub trait SpecifierRewriter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn rewrite(
        &self,
        file: &Path,
        source: &str,
        update: &dyn Fn(&str) -> String,
        sink: &dyn DiagnosticSink,
    ) -> RelocateResult<FileRewrite>;
}

/// Splice `edits` into `source`.
///
/// Edits may come in any order but must not overlap.
pub fn apply_edits(source: &str, edits: &mut [SpecifierEdit]) -> RelocateResult<String> {
    edits.sort_by_key(|edit| edit.range.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits.iter() {
        let Range { start, end } = edit.range;
        if start < cursor || end > source.len() || start > end {
            return Err(RelocateError::internal(format!(
                "Overlapping or out of bounds edit {start}..{end} for '{}'",
                edit.old_specifier
            )));
        }
        let before = source.get(cursor..start).ok_or_else(|| {
            RelocateError::internal(format!("Edit {start}..{end} splits a character"))
        })?;
        out.push_str(before);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    let rest = source.get(cursor..).ok_or_else(|| {
        RelocateError::internal(format!("Edit ending at {cursor} splits a character"))
    })?;
    out.push_str(rest);
    Ok(out)
}
