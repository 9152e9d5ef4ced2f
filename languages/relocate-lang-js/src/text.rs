//! Best-effort rewriting of quoted paths in files that are not parsed
//!
//! Leans on strictness: a candidate must be wrapped in single or double
//! quotes on one line, start with `./` or `../`, and contain no blanks.
//! Blanks between the quotes and the path are tolerated and dropped when the
//! path is rewritten.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use relocate_core::{FileRewrite, SpecifierEdit, SpecifierRewriter};
use relocate_foundation::{DiagnosticSink, RelocateResult};
use std::path::Path;

static QUOTED_RELATIVE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'[\t ]*(\.\.?/[^'\t\n\r ]*?)[\t ]*'|"[\t ]*(\.\.?/[^"\t\n\r ]*?)[\t ]*""#)
        .expect("quoted path pattern is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSpecifierRewriter;

impl TextSpecifierRewriter {
    pub fn new() -> Self {
        Self
    }
}

fn path_group<'t>(captures: &Captures<'t>) -> Option<(char, regex::Match<'t>)> {
    captures
        .get(1)
        .map(|m| ('\'', m))
        .or_else(|| captures.get(2).map(|m| ('"', m)))
}

impl SpecifierRewriter for TextSpecifierRewriter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn rewrite(
        &self,
        _file: &Path,
        source: &str,
        update: &dyn Fn(&str) -> String,
        _sink: &dyn DiagnosticSink,
    ) -> RelocateResult<FileRewrite> {
        let mut edits = Vec::new();
        for captures in QUOTED_RELATIVE_PATH.captures_iter(source) {
            let (Some(whole), Some((quote, path))) = (captures.get(0), path_group(&captures)) else {
                continue;
            };
            let specifier = path.as_str();
            let updated = update(specifier);
            if updated == specifier {
                continue;
            }
            let line = source[..whole.start()].matches('\n').count() + 1;
            edits.push(SpecifierEdit {
                range: whole.range(),
                line,
                old_specifier: specifier.to_string(),
                replacement: format!("{quote}{updated}{quote}"),
                new_specifier: updated,
            });
        }

        if edits.is_empty() {
            return Ok(FileRewrite::unchanged(source));
        }
        let content = relocate_core::apply_edits(source, &mut edits)?;
        Ok(FileRewrite { content, edits })
    }
}
