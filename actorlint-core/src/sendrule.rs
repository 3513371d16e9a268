//! The system-message send rule.
//!
//! Flags call sites that pass a message implementing the protected system
//! interface to the general send operation. The pipeline per call site:
//! cheap name filter, callee identity resolution against the allow-list,
//! message argument location by call shape, symbol resolution, interface
//! query. Any unresolved step skips the call silently; the rule prefers a
//! missed finding over a wrong one. At most one diagnostic per call site.

use syn::visit::{self, Visit};
use syn::{Expr, ExprCall, ExprMethodCall};

use crate::calls::{
    implemented_interfaces, resolve_message_symbol, resolve_method_callee, resolve_static_callee,
    LocalTypes,
};
use crate::config::SendRuleConfig;
use crate::diagnostics::{
    sort_diagnostics, system_message_text, Diagnostic, DiagnosticSink, Severity, RULE_CATEGORY,
    SYSTEM_MESSAGE_RULE_ID,
};
use crate::model::{Document, SourceSpan, Workspace};
use crate::symbols::SymbolIndex;

/// Check one document, appending findings to `sink`.
pub fn check_document(
    workspace: &Workspace,
    doc: &Document,
    cfg: &SendRuleConfig,
    sink: &mut dyn DiagnosticSink,
) {
    let locals = LocalTypes::collect(doc);
    let mut visitor = SendRuleVisitor {
        index: &workspace.index,
        doc,
        cfg,
        locals,
        sink,
    };
    visitor.visit_file(&doc.ast);
}

/// Check every document of the workspace. Findings come back in
/// deterministic order.
pub fn check_workspace(workspace: &Workspace, cfg: &SendRuleConfig) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for doc in workspace.documents() {
        check_document(workspace, doc, cfg, &mut diagnostics);
    }
    sort_diagnostics(&mut diagnostics);
    diagnostics
}

struct SendRuleVisitor<'a> {
    index: &'a SymbolIndex,
    doc: &'a Document,
    cfg: &'a SendRuleConfig,
    locals: LocalTypes,
    sink: &'a mut dyn DiagnosticSink,
}

impl SendRuleVisitor<'_> {
    fn names_target_method(&self, node: &ExprCall) -> bool {
        let Expr::Path(p) = &*node.func else {
            return false;
        };
        p.path
            .segments
            .last()
            .is_some_and(|s| s.ident == self.cfg.target_method)
    }

    fn check_message(&mut self, message: &Expr, call_span: proc_macro2::Span) {
        let Some(symbol) = resolve_message_symbol(self.index, self.doc, &self.locals, message)
        else {
            return;
        };
        let interfaces = implemented_interfaces(self.index, &symbol);
        if interfaces
            .iter()
            .any(|i| i.starts_with(&self.cfg.forbidden_interface))
        {
            // concrete findings escalate above the rule's nominal severity
            self.sink.report(Diagnostic {
                rule_id: SYSTEM_MESSAGE_RULE_ID,
                severity: Severity::Error,
                category: RULE_CATEGORY,
                message: system_message_text(&symbol.display),
                location: SourceSpan::of(&self.doc.path, call_span),
            });
        }
    }
}

impl<'ast> Visit<'ast> for SendRuleVisitor<'_> {
    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        if node.method == self.cfg.target_method {
            if let Some(identity) =
                resolve_method_callee(self.index, self.doc, &self.locals, node)
            {
                if self.cfg.allowed_callees.contains(&identity) {
                    if let Some(message) = node.args.first() {
                        self.check_message(message, node.paren_token.span.join());
                    }
                }
            }
        }
        visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        if self.names_target_method(node) {
            if let Some(identity) = resolve_static_callee(self.doc, node) {
                if self.cfg.allowed_callees.contains(&identity) {
                    // explicit-recipient form: the message is the second argument
                    if let Some(message) = node.args.iter().nth(1) {
                        self.check_message(message, node.paren_token.span.join());
                    }
                }
            }
        }
        visit::visit_expr_call(self, node);
    }
}
