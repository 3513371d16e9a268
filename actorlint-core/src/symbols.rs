//! Workspace-wide symbol index.
//!
//! Built once from all parsed documents, the index answers the semantic
//! questions the two analyses need:
//! - which traits a type directly implements (its interface set),
//! - where a type's own impl blocks live (excluded from reference counts),
//! - whether a type is "static" (a unit struct used purely as a namespace
//!   for associated functions),
//! - which enum contains a given variant (the containing-type fallback of
//!   the interface query).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use syn::spanned::Spanned;
use syn::{ImplItem, Item, ItemImpl};

use crate::model::{DeclKind, Document, Project, SourceSpan};
use crate::parse::{path_segments, type_path_segments};

/// Everything the index knows about one type declaration.
#[derive(Debug, Default)]
pub struct TypeEntry {
    pub kind: Option<DeclKind>,
    pub file: PathBuf,
    /// Direct trait impls, resolved to qualified trait names.
    pub interfaces: HashSet<String>,
    /// Variant names (enums only).
    pub variants: HashSet<String>,
    pub unit_struct: bool,
    pub has_inherent_impl: bool,
    pub inherent_only_associated: bool,
    /// Spans of all impl blocks for this type, any file.
    pub impl_spans: Vec<SourceSpan>,
}

/// Resolved symbol table over the whole workspace snapshot.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    types: HashMap<String, TypeEntry>,
}

impl SymbolIndex {
    /// Build the index from all documents of all projects: declarations
    /// first, then one pass over impl blocks to attach interface sets,
    /// impl spans, and inherent-impl shape.
    pub fn build(projects: &[Project]) -> Self {
        let mut index = SymbolIndex::default();

        for project in projects {
            for doc in &project.documents {
                for decl in doc.declarations() {
                    let entry = index.types.entry(decl.qualified_name.clone()).or_default();
                    entry.kind = Some(decl.kind);
                    entry.file = decl.file.clone();
                    entry.variants = decl.variants.iter().cloned().collect();
                    entry.unit_struct = decl.unit_struct;
                    entry.inherent_only_associated = true;
                }
            }
        }

        for project in projects {
            for doc in &project.documents {
                index.collect_impls(doc, &doc.ast.items);
            }
        }

        index
    }

    fn collect_impls(&mut self, doc: &Document, items: &[Item]) {
        for item in items {
            match item {
                Item::Impl(imp) => self.record_impl(doc, imp),
                Item::Mod(m) => {
                    if let Some((_, inner)) = &m.content {
                        self.collect_impls(doc, inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn record_impl(&mut self, doc: &Document, imp: &ItemImpl) {
        let Some(self_segs) = type_path_segments(&imp.self_ty) else {
            return;
        };
        let candidates = doc.resolve_candidates(&self_segs);
        let Some(target) = candidates.iter().find(|c| self.contains_type(c)) else {
            // impl for a type outside the analyzed workspace
            return;
        };
        let target = target.clone();
        let span = SourceSpan::of(&doc.path, imp.span());

        let trait_name = imp.trait_.as_ref().map(|(_, path, _)| {
            let segs = path_segments(path);
            doc.resolve_candidates(&segs)
                .into_iter()
                .next()
                .unwrap_or_else(|| segs.join("::"))
        });

        let entry = self.types.entry(target).or_default();
        entry.impl_spans.push(span);
        match trait_name {
            Some(name) => {
                entry.interfaces.insert(name);
            }
            None => {
                entry.has_inherent_impl = true;
                for item in &imp.items {
                    if let ImplItem::Fn(f) = item {
                        if f.sig.receiver().is_some() {
                            entry.inherent_only_associated = false;
                        }
                    }
                }
            }
        }
    }

    /// Everything known about one type, by qualified name.
    pub fn type_entry(&self, qualified: &str) -> Option<&TypeEntry> {
        self.types.get(qualified)
    }

    pub fn contains_type(&self, qualified: &str) -> bool {
        self.types.contains_key(qualified)
    }

    /// Direct interfaces of a type; empty for unknown types.
    pub fn interfaces_of(&self, qualified: &str) -> HashSet<String> {
        self.type_entry(qualified)
            .map(|e| e.interfaces.clone())
            .unwrap_or_default()
    }

    /// Spans of all impl blocks for a type.
    pub fn impl_spans_of(&self, qualified: &str) -> &[SourceSpan] {
        self.type_entry(qualified)
            .map(|e| e.impl_spans.as_slice())
            .unwrap_or(&[])
    }

    /// A unit struct whose inherent impls exist and contain only associated
    /// functions. Such types are reached through function-call dispatch the
    /// reference search does not attribute to the type itself.
    pub fn is_static_type(&self, qualified: &str) -> bool {
        self.type_entry(qualified).is_some_and(|e| {
            e.unit_struct && e.has_inherent_impl && e.inherent_only_associated
        })
    }

    /// If `qualified` names an enum variant (`path::Enum::Variant`), return
    /// the containing enum's qualified name.
    pub fn enum_of_variant<'q>(&self, qualified: &'q str) -> Option<&'q str> {
        let (parent, variant) = qualified.rsplit_once("::")?;
        let entry = self.types.get(parent)?;
        if entry.kind == Some(DeclKind::Enum) && entry.variants.contains(variant) {
            Some(parent)
        } else {
            None
        }
    }

    /// First candidate that names a type in the analyzed workspace.
    pub fn resolve_known_type(&self, doc: &Document, segments: &[String]) -> Option<String> {
        doc.resolve_candidates(segments)
            .into_iter()
            .find(|c| self.contains_type(c))
    }
}
