//! Which syntax nodes carry a module path, and which of those can be rewritten
//!
//! Recognised positions:
//!
//! ```text
//! import x from './a'            export * from './a'
//! import './a'                   export { x } from './a'
//! import('./a')                  import x = require('./a')
//! require('./a')                 proxyquire('./a', {})
//! global.require('./a')          globalThis.require('./a')   (permissive only)
//! ```
//!
//! Only plain string literals and template literals without substitutions
//! are rewritable. Anything else in a call position is reported.

use swc_common::{Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

const MODULE_FUNCTIONS: &[&str] = &["require", "proxyquire"];
const GLOBAL_OBJECTS: &[&str] = &["global", "globalThis"];

/// Delimiter shape of a rewritable literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralShape {
    String,
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LiteralSite {
    pub span: Span,
    pub shape: LiteralShape,
}

/// A path argument that was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkippedArgument {
    pub span: Span,
    pub reason: &'static str,
}

#[derive(Debug, Default)]
pub(crate) struct LiteralClassifier {
    permissive_require: bool,
    pub sites: Vec<LiteralSite>,
    pub skipped: Vec<SkippedArgument>,
}

impl LiteralClassifier {
    pub fn new(permissive_require: bool) -> Self {
        Self {
            permissive_require,
            ..Default::default()
        }
    }

    pub fn classify(mut self, module: &Module) -> Self {
        module.visit_with(&mut self);
        self.sites.sort_by_key(|site| site.span.lo);
        self.skipped.sort_by_key(|skipped| skipped.span.lo);
        self
    }

    fn record_str(&mut self, literal: &Str) {
        self.sites.push(LiteralSite {
            span: literal.span,
            shape: LiteralShape::String,
        });
    }

    fn skip(&mut self, span: Span, reason: &'static str) {
        self.skipped.push(SkippedArgument { span, reason });
    }

    /// `require`, `proxyquire`, dynamic `import`, and in permissive mode
    /// `global.require` / `globalThis.require`
    fn is_module_call(&self, callee: &Callee) -> bool {
        let expr = match callee {
            Callee::Import(_) => return true,
            Callee::Expr(expr) => expr,
            Callee::Super(_) => return false,
        };
        match &**expr {
            Expr::Ident(ident) => MODULE_FUNCTIONS.contains(&&*ident.sym),
            Expr::Member(member) if self.permissive_require => {
                let on_global = matches!(
                    &*member.obj,
                    Expr::Ident(obj) if GLOBAL_OBJECTS.contains(&&*obj.sym)
                );
                let is_require = matches!(
                    &member.prop,
                    MemberProp::Ident(prop) if &*prop.sym == "require"
                );
                on_global && is_require
            }
            _ => false,
        }
    }

    fn classify_argument(&mut self, call: &CallExpr) {
        let Some(first) = call.args.first() else {
            self.skip(call.span, "Call has no path argument");
            return;
        };
        if first.spread.is_some() {
            self.skip(first.expr.span(), "Cannot rewrite a spread argument");
            return;
        }
        match &*first.expr {
            Expr::Lit(Lit::Str(literal)) => self.record_str(literal),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() && tpl.quasis.len() == 1 => {
                self.sites.push(LiteralSite {
                    span: tpl.span,
                    shape: LiteralShape::Template,
                });
            }
            Expr::Tpl(tpl) => self.skip(
                tpl.span,
                "Cannot rewrite a template literal that contains expressions",
            ),
            Expr::Lit(_) => self.skip(first.expr.span(), "Path argument is not a string"),
            other => self.skip(
                other.span(),
                "Cannot rewrite a computed path argument",
            ),
        }
    }
}

impl Visit for LiteralClassifier {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        self.record_str(&node.src);
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        self.record_str(&node.src);
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        if let Some(src) = &node.src {
            self.record_str(src);
        }
    }

    fn visit_ts_external_module_ref(&mut self, node: &TsExternalModuleRef) {
        self.record_str(&node.expr);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.is_module_call(&node.callee) {
            self.classify_argument(node);
        }
        node.visit_children_with(self);
    }
}
