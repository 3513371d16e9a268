//! Per-file parsing into the program model.
//!
//! Each .rs file becomes a [`Document`]: syntax tree, module path, `use`
//! import map, and the type declarations it contains (inline modules
//! included). Parsing is lenient: unreadable or unparsable files are
//! reported as skipped, never as hard failures.
//!
//! Name resolution here is deliberately best-effort. `resolve_candidates`
//! produces qualified-name candidates in priority order and leaves the
//! final pick to the caller; a path the resolver cannot place simply yields
//! its textual form, which downstream checks treat as "not applicable".

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use syn::spanned::Spanned;
use syn::{Fields, Item, UseTree};

use crate::error::ActorlintError;
use crate::model::{DeclKind, Declaration, Document, SourceSpan};

/// Maximum file size to parse (10 MB). Larger files are skipped.
const MAX_FILE_SIZE: usize = 10_000_000;

/// Result of parsing a single document.
#[derive(Debug)]
pub enum ParseOutcome {
    /// Successfully parsed document
    Parsed(Document),
    /// Parse failed; carries the recoverable reason (logged by the caller,
    /// then skipped)
    Skipped(PathBuf, ActorlintError),
}

/// Parse one source file into a document of the program model.
pub fn parse_document(crate_name: &str, crate_root: &Path, path: &Path) -> ParseOutcome {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => return ParseOutcome::Skipped(path.to_path_buf(), ActorlintError::io(path, e)),
    };

    if text.len() > MAX_FILE_SIZE {
        return ParseOutcome::Skipped(
            path.to_path_buf(),
            ActorlintError::parse(
                path,
                format!("file too large ({} bytes, max {})", text.len(), MAX_FILE_SIZE),
            ),
        );
    }

    let ast = match syn::parse_file(&text) {
        Ok(ast) => ast,
        Err(e) => {
            return ParseOutcome::Skipped(
                path.to_path_buf(),
                ActorlintError::parse(path, format!("syntax error: {}", e)),
            )
        }
    };

    let module_path = module_path_for_file(crate_name, crate_root, path);
    let imports = collect_imports(&ast.items, crate_name, &module_path);
    let declarations =
        collect_declarations(&ast.items, path, crate_name, &module_path, &imports);

    ParseOutcome::Parsed(Document::new(
        path.to_path_buf(),
        text,
        ast,
        crate_name.to_string(),
        module_path,
        imports,
        declarations,
    ))
}

/// Module path of a file from filesystem conventions:
/// `src/lib.rs` and `src/main.rs` are the crate root, `src/foo/mod.rs` is
/// `crate::foo`, `src/foo/bar.rs` is `crate::foo::bar`.
pub fn module_path_for_file(crate_name: &str, crate_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(crate_root).unwrap_or(path);
    let mut parts: Vec<String> = vec![crate_name.to_string()];

    let components: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    let mut iter = components.iter().peekable();
    if iter.peek().is_some_and(|c| c.as_str() == "src") {
        iter.next();
    }

    while let Some(comp) = iter.next() {
        if iter.peek().is_some() {
            // directory component
            parts.push(comp.clone());
            continue;
        }
        // file component
        let stem = comp.trim_end_matches(".rs");
        if !matches!(stem, "lib" | "main" | "mod") {
            parts.push(stem.to_string());
        }
    }

    parts.join("::")
}

fn parent_module(module_path: &str) -> String {
    match module_path.rsplit_once("::") {
        Some((parent, _)) => parent.to_string(),
        None => module_path.to_string(),
    }
}

/// Candidate qualified names for a written path, most likely first.
///
/// `crate`/`self`/`super` heads resolve against the module context; an
/// imported head expands through the import map; a bare single segment is
/// first assumed module-local; a multi-segment path is first taken at face
/// value (it may already be fully qualified).
pub fn resolve_candidates(
    crate_name: &str,
    module_path: &str,
    imports: &HashMap<String, String>,
    segments: &[String],
) -> Vec<String> {
    if segments.is_empty() {
        return Vec::new();
    }
    let join = |prefix: &str, rest: &[String]| {
        if rest.is_empty() {
            prefix.to_string()
        } else {
            format!("{}::{}", prefix, rest.join("::"))
        }
    };

    let first = segments[0].as_str();
    let rest = &segments[1..];
    match first {
        "crate" => vec![join(crate_name, rest)],
        "self" => vec![join(module_path, rest)],
        "super" => vec![join(&parent_module(module_path), rest)],
        _ => {
            if let Some(target) = imports.get(first) {
                vec![join(target, rest), segments.join("::")]
            } else if segments.len() == 1 {
                vec![format!("{}::{}", module_path, first), first.to_string()]
            } else {
                vec![
                    segments.join("::"),
                    format!("{}::{}", module_path, segments.join("::")),
                ]
            }
        }
    }
}

/// Idents of a syn path, generic arguments dropped.
pub fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

/// Path segments of the type a value of `ty` is an instance of.
///
/// Unwraps references, parens, `Box`/`Arc`/`Rc`, and takes the first trait
/// bound of `dyn`/`impl` types (trait-typed receivers resolve to the trait
/// itself, which is how the trait-method send identity is matched).
pub fn type_path_segments(ty: &syn::Type) -> Option<Vec<String>> {
    match ty {
        syn::Type::Path(tp) => {
            if let Some(last) = tp.path.segments.last() {
                let name = last.ident.to_string();
                if matches!(name.as_str(), "Box" | "Arc" | "Rc") {
                    if let syn::PathArguments::AngleBracketed(args) = &last.arguments {
                        if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                            return type_path_segments(inner);
                        }
                    }
                }
            }
            Some(path_segments(&tp.path))
        }
        syn::Type::Reference(r) => type_path_segments(&r.elem),
        syn::Type::Paren(p) => type_path_segments(&p.elem),
        syn::Type::Group(g) => type_path_segments(&g.elem),
        syn::Type::TraitObject(t) => first_bound_segments(&t.bounds),
        syn::Type::ImplTrait(t) => first_bound_segments(&t.bounds),
        _ => None,
    }
}

fn first_bound_segments(
    bounds: &syn::punctuated::Punctuated<syn::TypeParamBound, syn::token::Plus>,
) -> Option<Vec<String>> {
    bounds.iter().find_map(|b| match b {
        syn::TypeParamBound::Trait(tb) => Some(path_segments(&tb.path)),
        _ => None,
    })
}

/// Collect `use` aliases from a list of items, descending into inline
/// modules. Aliases from inline modules land in the document-level map;
/// per-module scoping is not modeled (an accepted over-approximation).
fn collect_imports(
    items: &[Item],
    crate_name: &str,
    module_path: &str,
) -> HashMap<String, String> {
    let mut imports = HashMap::new();
    collect_imports_into(items, crate_name, module_path, &mut imports);
    imports
}

fn collect_imports_into(
    items: &[Item],
    crate_name: &str,
    module_path: &str,
    imports: &mut HashMap<String, String>,
) {
    for item in items {
        match item {
            Item::Use(u) => {
                expand_use_tree(&u.tree, &mut Vec::new(), crate_name, module_path, imports);
            }
            Item::Mod(m) => {
                if let Some((_, inner)) = &m.content {
                    collect_imports_into(inner, crate_name, module_path, imports);
                }
            }
            _ => {}
        }
    }
}

fn expand_use_tree(
    tree: &UseTree,
    prefix: &mut Vec<String>,
    crate_name: &str,
    module_path: &str,
    imports: &mut HashMap<String, String>,
) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            expand_use_tree(&p.tree, prefix, crate_name, module_path, imports);
            prefix.pop();
        }
        UseTree::Name(n) => {
            let mut full = prefix.clone();
            full.push(n.ident.to_string());
            imports.insert(
                n.ident.to_string(),
                qualify_use_path(&full, crate_name, module_path),
            );
        }
        UseTree::Rename(r) => {
            let mut full = prefix.clone();
            full.push(r.ident.to_string());
            imports.insert(
                r.rename.to_string(),
                qualify_use_path(&full, crate_name, module_path),
            );
        }
        UseTree::Group(g) => {
            for t in &g.items {
                expand_use_tree(t, prefix, crate_name, module_path, imports);
            }
        }
        UseTree::Glob(_) => {
            // Glob imports cannot be resolved without full name binding;
            // paths that relied on them fall back to their textual form.
        }
    }
}

/// All full segment paths named by a use tree (`use a::{b::C, d::E as F}`
/// yields `a::b::C` and `a::d::E`). Globs contribute nothing.
pub(crate) fn use_tree_targets(tree: &UseTree) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut prefix = Vec::new();
    use_tree_targets_into(tree, &mut prefix, &mut out);
    out
}

fn use_tree_targets_into(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            use_tree_targets_into(&p.tree, prefix, out);
            prefix.pop();
        }
        UseTree::Name(n) => {
            let mut full = prefix.clone();
            full.push(n.ident.to_string());
            out.push(full);
        }
        UseTree::Rename(r) => {
            let mut full = prefix.clone();
            full.push(r.ident.to_string());
            out.push(full);
        }
        UseTree::Group(g) => {
            for t in &g.items {
                use_tree_targets_into(t, prefix, out);
            }
        }
        UseTree::Glob(_) => {}
    }
}

fn qualify_use_path(segments: &[String], crate_name: &str, module_path: &str) -> String {
    let rest = &segments[1..];
    let join = |prefix: &str, rest: &[String]| {
        if rest.is_empty() {
            prefix.to_string()
        } else {
            format!("{}::{}", prefix, rest.join("::"))
        }
    };
    match segments[0].as_str() {
        "crate" => join(crate_name, rest),
        "self" => join(module_path, rest),
        "super" => join(&parent_module(module_path), rest),
        _ => segments.join("::"),
    }
}

/// Collect struct/enum declarations, descending into inline modules with
/// the namespace stack extended per module. Source order is preserved.
fn collect_declarations(
    items: &[Item],
    file: &Path,
    crate_name: &str,
    module_path: &str,
    imports: &HashMap<String, String>,
) -> Vec<Declaration> {
    let mut namespace: Vec<String> = module_path.split("::").map(String::from).collect();
    let mut out = Vec::new();
    collect_declarations_into(
        items,
        file,
        crate_name,
        module_path,
        imports,
        &mut namespace,
        &mut out,
    );
    out
}

fn collect_declarations_into(
    items: &[Item],
    file: &Path,
    crate_name: &str,
    module_path: &str,
    imports: &HashMap<String, String>,
    namespace: &mut Vec<String>,
    out: &mut Vec<Declaration>,
) {
    for item in items {
        match item {
            Item::Struct(s) => {
                let simple_name = s.ident.to_string();
                let base_type = newtype_base(&s.fields, crate_name, module_path, imports);
                out.push(Declaration {
                    qualified_name: format!("{}::{}", namespace.join("::"), simple_name),
                    simple_name,
                    kind: DeclKind::Struct,
                    namespace: namespace.join("::"),
                    file: file.to_path_buf(),
                    span: SourceSpan::of(file, s.span()),
                    base_type,
                    variants: Vec::new(),
                    unit_struct: matches!(s.fields, Fields::Unit),
                    is_static: false,
                });
            }
            Item::Enum(e) => {
                let simple_name = e.ident.to_string();
                out.push(Declaration {
                    qualified_name: format!("{}::{}", namespace.join("::"), simple_name),
                    simple_name,
                    kind: DeclKind::Enum,
                    namespace: namespace.join("::"),
                    file: file.to_path_buf(),
                    span: SourceSpan::of(file, e.span()),
                    base_type: None,
                    variants: e.variants.iter().map(|v| v.ident.to_string()).collect(),
                    unit_struct: false,
                    is_static: false,
                });
            }
            Item::Mod(m) => {
                if let Some((_, inner)) = &m.content {
                    namespace.push(m.ident.to_string());
                    collect_declarations_into(
                        inner,
                        file,
                        crate_name,
                        module_path,
                        imports,
                        namespace,
                        out,
                    );
                    namespace.pop();
                }
            }
            _ => {}
        }
    }
}

/// Base type of a newtype: single-field tuple struct wrapping a path type.
fn newtype_base(
    fields: &Fields,
    crate_name: &str,
    module_path: &str,
    imports: &HashMap<String, String>,
) -> Option<String> {
    let Fields::Unnamed(unnamed) = fields else {
        return None;
    };
    if unnamed.unnamed.len() != 1 {
        return None;
    }
    let segs = type_path_segments(&unnamed.unnamed.first()?.ty)?;
    resolve_candidates(crate_name, module_path, imports, &segs)
        .into_iter()
        .next()
}
