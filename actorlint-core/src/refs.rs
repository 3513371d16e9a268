//! Whole-workspace reference search.
//!
//! For one declaration, every document of every project is walked for path
//! expressions and `use` imports that resolve to the declaration's
//! qualified name (or a name nested under it, such as an enum variant).
//! The declaration site itself and the type's own impl blocks are never
//! counted: a type whose only mentions are its own definition is dead.
//!
//! Resolution is candidate-based: a written path counts as a reference if
//! *any* of its resolution candidates hits the declaration. This errs
//! toward liveness, the documented bias of the detector.

use syn::spanned::Spanned;
use syn::visit::{self, Visit};

use crate::model::{Declaration, Document, ReferenceLocation, SourceSpan, Workspace};
use crate::parse::{path_segments, use_tree_targets};

/// Exhaustive, workspace-wide reference search for `decl`.
pub fn find_references(workspace: &Workspace, decl: &Declaration) -> Vec<ReferenceLocation> {
    let impl_spans = workspace.index.impl_spans_of(&decl.qualified_name);

    // Syntax trees are not Send; the walk is per-document sequential.
    let mut refs: Vec<ReferenceLocation> = Vec::new();
    for doc in workspace.documents() {
        let mut visitor = ReferenceVisitor {
            doc,
            decl,
            impl_spans,
            found: Vec::new(),
        };
        visitor.visit_file(&doc.ast);
        refs.extend(visitor.found);
    }

    refs.sort_by(|a, b| {
        (&a.file, a.start_line, a.start_column).cmp(&(&b.file, b.start_line, b.start_column))
    });
    refs
}

struct ReferenceVisitor<'a> {
    doc: &'a Document,
    decl: &'a Declaration,
    impl_spans: &'a [SourceSpan],
    found: Vec<ReferenceLocation>,
}

impl ReferenceVisitor<'_> {
    fn excluded(&self, span: &SourceSpan) -> bool {
        self.decl.span.contains(span) || self.impl_spans.iter().any(|s| s.contains(span))
    }

    fn matches(&self, segments: &[String]) -> bool {
        if segments.is_empty() {
            return false;
        }
        // Bare mention in the declaring file: inline-module locals resolve
        // against the file module path, so accept the name match directly.
        if segments.len() == 1
            && segments[0] == self.decl.simple_name
            && self.doc.path == self.decl.file
        {
            return true;
        }
        let prefix = format!("{}::", self.decl.qualified_name);
        self.doc
            .resolve_candidates(segments)
            .iter()
            .any(|c| *c == self.decl.qualified_name || c.starts_with(&prefix))
    }
}

impl<'ast> Visit<'ast> for ReferenceVisitor<'_> {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let simple = self.decl.simple_name.as_str();
        if node.segments.iter().any(|s| s.ident == simple) {
            let span = SourceSpan::of(&self.doc.path, node.span());
            if !self.excluded(&span) && self.matches(&path_segments(node)) {
                self.found.push(span);
            }
        }
        visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let span = SourceSpan::of(&self.doc.path, node.span());
        if !self.excluded(&span) {
            for target in use_tree_targets(&node.tree) {
                if self.matches(&target) {
                    self.found.push(span);
                    break;
                }
            }
        }
        visit::visit_item_use(self, node);
    }
}
