//! Specifier rewriting for JavaScript and TypeScript sources

use relocate_core::{FileRewrite, QuoteStyle, SpecifierEdit, SpecifierRewriter};
use relocate_foundation::{Diagnostic, DiagnosticKind, DiagnosticSink, RelocateResult};
use std::path::Path;
use tracing::debug;

use crate::classifier::{LiteralClassifier, LiteralShape};
use crate::parser::parse_module;

const MANUAL_UPDATE_HINT: &str = "You might want to update it manually if it refers to a moved file.";

/// Rewrites module specifiers found by the swc-based classifier.
///
/// Edits are spliced into the original text at the literal's span, so
/// comments and formatting around the literal survive untouched.
#[derive(Debug, Clone, Default)]
pub struct JsSpecifierRewriter {
    quote: QuoteStyle,
    permissive_require: bool,
}

impl JsSpecifierRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote_style(mut self, quote: QuoteStyle) -> Self {
        self.quote = quote;
        self
    }

    /// Also treat `global.require` and `globalThis.require` as module calls
    pub fn with_permissive_require(mut self, permissive: bool) -> Self {
        self.permissive_require = permissive;
        self
    }
}

impl SpecifierRewriter for JsSpecifierRewriter {
    fn name(&self) -> &'static str {
        "js"
    }

    fn rewrite(
        &self,
        file: &Path,
        source: &str,
        update: &dyn Fn(&str) -> String,
        sink: &dyn DiagnosticSink,
    ) -> RelocateResult<FileRewrite> {
        let parsed = parse_module(file, source)?;
        let classifier = LiteralClassifier::new(self.permissive_require).classify(&parsed.module);

        for skipped in &classifier.skipped {
            sink.report(
                Diagnostic::warning(
                    DiagnosticKind::UnsupportedLiteral,
                    file,
                    format!("{}. {MANUAL_UPDATE_HINT}", skipped.reason),
                )
                .at(parsed.location(skipped.span)),
            );
        }

        let mut edits = Vec::new();
        for site in &classifier.sites {
            let Some(range) = parsed.byte_range(site.span) else {
                debug!(file = %file.display(), "Literal span outside of the source, skipping");
                continue;
            };
            let raw = &source[range.clone()];
            let quote = match site.shape {
                LiteralShape::Template => '`',
                LiteralShape::String => match raw.chars().next() {
                    Some(c @ ('\'' | '"')) => c,
                    _ => continue,
                },
            };
            let Some(specifier) = raw
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
            else {
                continue;
            };

            if specifier.contains('\\') {
                sink.report(
                    Diagnostic::warning(
                        DiagnosticKind::UnsupportedLiteral,
                        file,
                        format!("Cannot rewrite a path containing escape sequences. {MANUAL_UPDATE_HINT}"),
                    )
                    .at(parsed.location(site.span)),
                );
                continue;
            }

            let updated = update(specifier);
            if updated == specifier {
                continue;
            }

            edits.push(SpecifierEdit {
                range,
                line: parsed.location(site.span).line,
                old_specifier: specifier.to_string(),
                replacement: self.quote.quote(quote, &updated),
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
