//! swc parsing with positions mapped back to the original text

use relocate_foundation::{RelocateError, RelocateResult, SourceLocation};
use std::ops::Range;
use std::path::Path;
use swc_common::{sync::Lrc, FileName, FilePathMapping, SourceFile, SourceMap, Span, Spanned};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use tracing::debug;

/// A parsed module together with what is needed to map spans to text
pub(crate) struct ParsedModule {
    pub module: Module,
    source_map: Lrc<SourceMap>,
    source_file: Lrc<SourceFile>,
    /// Bytes of the input that precede the text swc indexes, i.e. a
    /// byte-order mark
    prefix_len: usize,
}

impl ParsedModule {
    /// Byte range of `span` inside the source passed to `parse_module`
    pub fn byte_range(&self, span: Span) -> Option<Range<usize>> {
        let base = self.source_file.start_pos.0;
        if span.lo.0 < base || span.hi.0 < span.lo.0 {
            return None;
        }
        let start = (span.lo.0 - base) as usize;
        let end = (span.hi.0 - base) as usize;
        (end <= self.source_file.src.len())
            .then_some(start + self.prefix_len..end + self.prefix_len)
    }

    /// 1-based line and column of the start of `span`
    pub fn location(&self, span: Span) -> SourceLocation {
        let loc = self.source_map.lookup_char_pos(span.lo);
        SourceLocation {
            line: loc.line,
            column: loc.col_display + 1,
        }
    }
}

fn syntax_for(path: &Path) -> Syntax {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") | Some("mts") | Some("cts") => Syntax::Typescript(TsSyntax {
            tsx: false,
            decorators: true,
            ..Default::default()
        }),
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    }
}

/// Syntax retried when a `.js`-like file does not parse as plain ECMAScript,
/// which covers files carrying type annotations.
fn fallback_syntax() -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        ..Default::default()
    })
}

fn parse_with(file: &Path, source: &str, syntax: Syntax) -> RelocateResult<ParsedModule> {
    let cm = Lrc::new(SourceMap::new(FilePathMapping::empty()));
    let file_name = Lrc::new(FileName::Real(file.to_path_buf()));
    let source_file = cm.new_source_file(file_name, source.to_string());
    let lexer = Lexer::new(syntax, Default::default(), StringInput::from(&*source_file), None);
    let mut parser = Parser::new_from(lexer);

    match parser.parse_module() {
        Ok(module) => {
            let indexed: &str = &source_file.src;
            let prefix_len = if source.ends_with(indexed) {
                source.len() - indexed.len()
            } else {
                0
            };
            for recovered in parser.take_errors() {
                debug!(
                    file = %file.display(),
                    error = %recovered.kind().msg(),
                    "Recovered from syntax error"
                );
            }
            Ok(ParsedModule {
                module,
                source_map: cm,
                source_file,
                prefix_len,
            })
        }
        Err(e) => {
            let message = format!("Failed to parse module: {}", e.kind().msg());
            let span = e.span();
            if span.lo.0 < source_file.start_pos.0 {
                return Err(RelocateError::parse(file, message));
            }
            let loc = cm.lookup_char_pos(span.lo);
            Err(RelocateError::parse_at(file, message, loc.line, loc.col_display + 1))
        }
    }
}

/// Parse `source` as the module kind its extension suggests
pub(crate) fn parse_module(file: &Path, source: &str) -> RelocateResult<ParsedModule> {
    let syntax = syntax_for(file);
    let is_typescript = matches!(syntax, Syntax::Typescript(_));
    match parse_with(file, source, syntax) {
        Ok(parsed) => Ok(parsed),
        Err(first) if !is_typescript => {
            debug!(
                file = %file.display(),
                error = %first,
                "Retrying parse with type annotations enabled"
            );
            parse_with(file, source, fallback_syntax()).map_err(|_| first)
        }
        Err(e) => Err(e),
    }
}
