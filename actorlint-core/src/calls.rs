//! Call-site resolution for the program model.
//!
//! Binds call expressions to fully-qualified callee identities and message
//! arguments to type symbols, using only what is statically visible in one
//! document: typed `let` bindings, typed function parameters, the import
//! map, and the workspace symbol index. Anything outside that is
//! `None`/unresolved, never an error; the checks simply skip the call.

use std::collections::{HashMap, HashSet};

use syn::visit::{self, Visit};
use syn::{Expr, ExprCall, ExprMethodCall, Pat};

use crate::model::Document;
use crate::parse::{path_segments, type_path_segments};
use crate::symbols::SymbolIndex;

/// Variable name -> declared type path, from typed lets and fn parameters.
///
/// Scoping is not modeled: a name bound to two different types anywhere in
/// the document becomes ambiguous and resolves to nothing (skipping the
/// call site is safer than guessing).
#[derive(Debug, Default)]
pub struct LocalTypes {
    types: HashMap<String, Vec<String>>,
    ambiguous: HashSet<String>,
}

impl LocalTypes {
    pub fn collect(doc: &Document) -> Self {
        let mut collector = LocalTypeCollector(LocalTypes::default());
        collector.visit_file(&doc.ast);
        collector.0
    }

    pub fn type_of(&self, name: &str) -> Option<&[String]> {
        if self.ambiguous.contains(name) {
            return None;
        }
        self.types.get(name).map(Vec::as_slice)
    }

    fn record(&mut self, name: String, segments: Vec<String>) {
        match self.types.get(&name) {
            Some(existing) if *existing != segments => {
                self.ambiguous.insert(name);
            }
            Some(_) => {}
            None => {
                self.types.insert(name, segments);
            }
        }
    }
}

struct LocalTypeCollector(LocalTypes);

impl<'ast> Visit<'ast> for LocalTypeCollector {
    fn visit_pat_type(&mut self, node: &'ast syn::PatType) {
        if let Pat::Ident(pi) = &*node.pat {
            if let Some(segments) = type_path_segments(&node.ty) {
                self.0.record(pi.ident.to_string(), segments);
            }
        }
        visit::visit_pat_type(self, node);
    }
}

/// Identity of a member-form call (`recv.method(...)`): the receiver's
/// resolved type followed by the method name.
pub fn resolve_method_callee(
    index: &SymbolIndex,
    doc: &Document,
    locals: &LocalTypes,
    call: &ExprMethodCall,
) -> Option<String> {
    let receiver = single_ident(&call.receiver)?;
    let ty_segments = locals.type_of(&receiver)?;
    let ty = index
        .resolve_known_type(doc, ty_segments)
        .or_else(|| doc.resolve_candidates(ty_segments).into_iter().next())?;
    Some(format!("{}::{}", ty, call.method))
}

/// Identity of a static-form call (`Path::method(...)`): the resolved
/// function path itself.
pub fn resolve_static_callee(doc: &Document, call: &ExprCall) -> Option<String> {
    let Expr::Path(p) = &*call.func else {
        return None;
    };
    let segments = path_segments(&p.path);
    doc.resolve_candidates(&segments).into_iter().next()
}

/// A resolved message argument: the precise symbol (a type, or an enum
/// variant that has no type of its own) plus the type that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSymbol {
    /// Display string for diagnostics.
    pub display: String,
    /// The symbol's own type, when the symbol is itself a type.
    pub own_type: Option<String>,
    /// The containing type, when the symbol is nested in one (enum variant).
    pub containing_type: Option<String>,
}

/// Resolve the symbol bound to a message argument expression.
///
/// Handles the statically obvious shapes: a typed local, a struct literal,
/// a constructor call (`Type::new(..)`, tuple-struct or variant call), and
/// a plain type or variant path. Everything else is unresolved.
pub fn resolve_message_symbol(
    index: &SymbolIndex,
    doc: &Document,
    locals: &LocalTypes,
    expr: &Expr,
) -> Option<MessageSymbol> {
    match expr {
        Expr::Path(p) => {
            let segments = path_segments(&p.path);
            if segments.len() == 1 {
                if let Some(ty_segments) = locals.type_of(&segments[0]) {
                    return type_or_variant(index, doc, ty_segments);
                }
            }
            type_or_variant(index, doc, &segments)
        }
        Expr::Struct(s) => type_or_variant(index, doc, &path_segments(&s.path)),
        Expr::Call(c) => {
            let Expr::Path(p) = &*c.func else {
                return None;
            };
            let mut segments = path_segments(&p.path);
            // Constructor convention: Type::new(..) names the type one
            // segment up; tuple-struct and variant calls name it directly.
            if segments.len() >= 2
                && segments
                    .last()
                    .is_some_and(|s| s.chars().next().is_some_and(char::is_lowercase))
            {
                segments.pop();
            }
            type_or_variant(index, doc, &segments)
        }
        Expr::Reference(r) => resolve_message_symbol(index, doc, locals, &r.expr),
        Expr::Paren(p) => resolve_message_symbol(index, doc, locals, &p.expr),
        _ => None,
    }
}

fn type_or_variant(index: &SymbolIndex, doc: &Document, segments: &[String]) -> Option<MessageSymbol> {
    if let Some(ty) = index.resolve_known_type(doc, segments) {
        return Some(MessageSymbol {
            display: ty.clone(),
            own_type: Some(ty),
            containing_type: None,
        });
    }
    for candidate in doc.resolve_candidates(segments) {
        if let Some(enum_name) = index.enum_of_variant(&candidate) {
            return Some(MessageSymbol {
                display: candidate.clone(),
                own_type: None,
                containing_type: Some(enum_name.to_string()),
            });
        }
    }
    None
}

/// Direct interfaces of the symbol's own type unioned with the direct
/// interfaces of its containing type, if any.
///
/// The containing-type union exists to catch message symbols nested inside
/// a container (enum variants here): the variant implements nothing itself,
/// the enum around it may carry the marker trait.
pub fn implemented_interfaces(index: &SymbolIndex, symbol: &MessageSymbol) -> HashSet<String> {
    let mut interfaces = HashSet::new();
    if let Some(own) = &symbol.own_type {
        interfaces.extend(index.interfaces_of(own));
    }
    if let Some(containing) = &symbol.containing_type {
        interfaces.extend(index.interfaces_of(containing));
    }
    interfaces
}

fn single_ident(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(p) if p.path.segments.len() == 1 => {
            Some(p.path.segments[0].ident.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Project};
    use crate::parse::{parse_document, ParseOutcome};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn fixture(content: &str) -> (PathBuf, Document, SymbolIndex) {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "actorlint_calls_{}_{}",
            std::process::id(),
            id
        ));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(dir.join("src")).unwrap();
        let path = dir.join("src/lib.rs");
        fs::write(&path, content).unwrap();
        let doc = match parse_document("app", &dir, &path) {
            ParseOutcome::Parsed(doc) => doc,
            ParseOutcome::Skipped(p, reason) => panic!("skipped {}: {}", p.display(), reason),
        };
        // index wants whole projects; a single-document project suffices
        let project = Project {
            name: "app".to_string(),
            root: dir.clone(),
            documents: vec![doc],
        };
        let index = SymbolIndex::build(std::slice::from_ref(&project));
        let doc = project.documents.into_iter().next().unwrap();
        (dir, doc, index)
    }

    fn first_method_call(doc: &Document) -> ExprMethodCall {
        struct Finder(Option<ExprMethodCall>);
        impl<'ast> Visit<'ast> for Finder {
            fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
                if self.0.is_none() {
                    self.0 = Some(node.clone());
                }
            }
        }
        let mut finder = Finder(None);
        finder.visit_file(&doc.ast);
        finder.0.expect("no method call in fixture")
    }

    #[test]
    fn test_local_types_from_params_and_lets() {
        let (dir, doc, _index) = fixture(
            r#"
use actor_core::ActorRef;
fn run(target: ActorRef) {
    let other: actor_core::ActorRef = target;
}
"#,
        );
        let locals = LocalTypes::collect(&doc);
        assert_eq!(locals.type_of("target"), Some(&["ActorRef".to_string()][..]));
        assert_eq!(
            locals.type_of("other"),
            Some(&["actor_core".to_string(), "ActorRef".to_string()][..])
        );
        assert_eq!(locals.type_of("missing"), None);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ambiguous_local_resolves_to_nothing() {
        let (dir, doc, _index) = fixture(
            r#"
fn a(x: u32) {}
fn b(x: String) {}
"#,
        );
        let locals = LocalTypes::collect(&doc);
        assert_eq!(locals.type_of("x"), None);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_method_callee_via_import() {
        let (dir, doc, index) = fixture(
            r#"
use actor_core::ActorRef;
fn run(target: ActorRef) {
    target.tell(1);
}
"#,
        );
        let locals = LocalTypes::collect(&doc);
        let call = first_method_call(&doc);
        let identity = resolve_method_callee(&index, &doc, &locals, &call);
        assert_eq!(identity.as_deref(), Some("actor_core::ActorRef::tell"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_trait_object_receiver_resolves_to_trait() {
        let (dir, doc, index) = fixture(
            r#"
use actor_core::CanTell;
fn run(target: Box<dyn CanTell>) {
    target.tell(1);
}
"#,
        );
        let locals = LocalTypes::collect(&doc);
        let call = first_method_call(&doc);
        let identity = resolve_method_callee(&index, &doc, &locals, &call);
        assert_eq!(identity.as_deref(), Some("actor_core::CanTell::tell"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_message_symbol_for_variant_has_containing_type() {
        let (dir, doc, index) = fixture(
            r#"
pub enum Control { Stop, Resume }
fn make() {
    let _ = Control::Stop;
}
"#,
        );
        let locals = LocalTypes::collect(&doc);
        let expr: Expr = syn::parse_str("Control::Stop").unwrap();
        let symbol = resolve_message_symbol(&index, &doc, &locals, &expr).unwrap();
        assert_eq!(symbol.own_type, None);
        assert_eq!(symbol.containing_type.as_deref(), Some("app::Control"));
        assert_eq!(symbol.display, "app::Control::Stop");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_message_symbol_for_constructor_call() {
        let (dir, doc, index) = fixture("pub struct Ping;\nimpl Ping { pub fn new() -> Ping { Ping } }\n");
        let locals = LocalTypes::collect(&doc);
        let expr: Expr = syn::parse_str("Ping::new()").unwrap();
        let symbol = resolve_message_symbol(&index, &doc, &locals, &expr).unwrap();
        assert_eq!(symbol.own_type.as_deref(), Some("app::Ping"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unresolvable_message_is_none() {
        let (dir, doc, index) = fixture("fn f() {}");
        let locals = LocalTypes::collect(&doc);
        let expr: Expr = syn::parse_str("compute_message()").unwrap();
        assert!(resolve_message_symbol(&index, &doc, &locals, &expr).is_none());
        fs::remove_dir_all(&dir).ok();
    }
}
