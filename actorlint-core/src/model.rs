//! The program model: a parsed, read-only view of a Rust workspace.
//!
//! A [`Workspace`] owns a set of [`Project`]s (Cargo crates), each a set of
//! [`Document`]s (.rs files with their syntax tree and per-file binding
//! context). The model is built once per analysis run and never mutated by
//! the analyses; the unused-type detector produces rewritten *copies* of
//! document text, it does not edit the model.
//!
//! Project discovery prefers `cargo metadata` and falls back to a directory
//! scan, so the model loads both real workspaces and bare fixture trees.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{ActorlintError, ActorlintResult};
use crate::parse::{self, ParseOutcome};
use crate::refs;
use crate::scan::{gather_crate_roots, gather_rs_files};
use crate::symbols::SymbolIndex;

/// A source location: file plus 1-indexed line/column range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceSpan {
    /// Build a span from a proc-macro2 span (requires span-locations).
    pub fn of(file: &Path, span: proc_macro2::Span) -> Self {
        let start = span.start();
        let end = span.end();
        Self {
            file: file.to_path_buf(),
            start_line: start.line,
            start_column: start.column + 1,
            end_line: end.line,
            end_column: end.column + 1,
        }
    }

    /// Whether `other` starts inside this span (same file, inclusive bounds).
    pub fn contains(&self, other: &SourceSpan) -> bool {
        if self.file != other.file {
            return false;
        }
        let start = (self.start_line, self.start_column);
        let end = (self.end_line, self.end_column);
        let point = (other.start_line, other.start_column);
        start <= point && point <= end
    }
}

/// A site where a declared symbol is used (never the declaration itself).
pub type ReferenceLocation = SourceSpan;

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Struct,
    Enum,
}

/// A named type definition found in a document.
///
/// Immutable for the duration of an analysis pass; qualified names are
/// unique within a workspace snapshot.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Namespace path + simple name, `::`-joined.
    pub qualified_name: String,
    /// The bare type name.
    pub simple_name: String,
    pub kind: DeclKind,
    /// Module path containing the declaration (crate name included).
    pub namespace: String,
    /// Declaring document.
    pub file: PathBuf,
    /// Span of the whole item, attributes included.
    pub span: SourceSpan,
    /// Inner type of a single-field tuple struct (newtype pattern), if any.
    pub base_type: Option<String>,
    /// Variant names (enums only).
    pub variants: Vec<String>,
    /// Unit struct shape, input to the is-static computation.
    pub unit_struct: bool,
    /// Namespace-only type: a unit struct whose inherent impls exist and
    /// hold only associated functions. Filled in after index construction.
    pub is_static: bool,
}

impl Declaration {
    /// Name of the base type without its path, for marker matching.
    pub fn base_type_name(&self) -> Option<&str> {
        self.base_type
            .as_deref()
            .map(|b| b.rsplit("::").next().unwrap_or(b))
    }
}

/// One source file: text, syntax tree, and binding context.
#[derive(Debug)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
    pub ast: syn::File,
    /// Name of the owning crate, underscored.
    pub crate_name: String,
    /// Module path of this file (crate name included).
    pub module_path: String,
    /// `use` aliases: local name -> fully-qualified path.
    pub imports: HashMap<String, String>,
    declarations: Vec<Declaration>,
}

impl Document {
    pub(crate) fn new(
        path: PathBuf,
        text: String,
        ast: syn::File,
        crate_name: String,
        module_path: String,
        imports: HashMap<String, String>,
        declarations: Vec<Declaration>,
    ) -> Self {
        Self {
            path,
            text,
            ast,
            crate_name,
            module_path,
            imports,
            declarations,
        }
    }

    /// All type declarations in this document, in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub(crate) fn declarations_mut(&mut self) -> &mut [Declaration] {
        &mut self.declarations
    }

    /// Candidate qualified names for a path written in this document, in
    /// priority order. Callers pick the first candidate known to the symbol
    /// index, or the first candidate overall when the path names something
    /// outside the analyzed workspace.
    pub fn resolve_candidates(&self, segments: &[String]) -> Vec<String> {
        parse::resolve_candidates(&self.crate_name, &self.module_path, &self.imports, segments)
    }
}

/// One Cargo crate under analysis.
#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub root: PathBuf,
    pub documents: Vec<Document>,
}

/// The full set of projects/documents under analysis, plus the symbol index
/// built from them. The model is the single consistent snapshot both
/// analyses read.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub projects: Vec<Project>,
    pub index: SymbolIndex,
}

/// Minimal subset of `cargo metadata` output we need.
#[derive(Debug, Deserialize)]
struct CargoMetadata {
    packages: Vec<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    manifest_path: String,
}

/// Try using `cargo metadata` for project discovery; it respects the
/// workspace layout in Cargo.toml. Returns None when cargo is unavailable
/// or the manifest does not parse.
fn try_cargo_metadata(path: &Path) -> Option<CargoMetadata> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--no-deps", "--format-version", "1"])
        .current_dir(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    serde_json::from_slice(&output.stdout).ok()
}

/// Find all crate roots under a workspace root.
/// Prefers `cargo metadata` when available, falls back to a recursive
/// directory scan for manifests (so bare fixture trees and `crates/foo/`
/// layouts both load without a functioning cargo).
pub fn discover_projects(root: &Path) -> ActorlintResult<Vec<PathBuf>> {
    if let Some(meta) = try_cargo_metadata(root) {
        let mut crates = Vec::new();
        for pkg in meta.packages {
            let manifest = PathBuf::from(&pkg.manifest_path);
            if let Some(parent) = manifest.parent() {
                crates.push(parent.to_path_buf());
            }
        }
        if !crates.is_empty() {
            return Ok(crates);
        }
    }

    Ok(gather_crate_roots(root))
}

/// Extract the crate name from Cargo.toml content, underscored so it can
/// serve as the root of module paths.
fn parse_crate_name(cargo_toml: &str) -> String {
    for line in cargo_toml.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("name") {
            if let Some((_, value)) = trimmed.split_once('=') {
                return value
                    .trim()
                    .trim_matches('"')
                    .trim_matches('\'')
                    .replace('-', "_");
            }
        }
    }
    "unknown".to_string()
}

impl Workspace {
    /// Load and parse every crate under `root` into one analysis snapshot.
    ///
    /// Fault-tolerant per file: documents that fail to read or parse are
    /// skipped with a warning, never aborting the load. Fails only when the
    /// root itself yields no crates.
    pub fn load(root: &Path) -> ActorlintResult<Workspace> {
        let canonical = root
            .canonicalize()
            .map_err(|e| ActorlintError::io(root, e))?;

        let crate_roots = discover_projects(&canonical)?;
        if crate_roots.is_empty() {
            return Err(ActorlintError::workspace(
                &canonical,
                "no crates found under workspace root",
            ));
        }

        let projects: Vec<Project> = crate_roots
            .into_iter()
            .filter_map(|crate_root| match load_project(&crate_root) {
                Ok(project) => Some(project),
                Err(e) => {
                    warn!(crate_root = %crate_root.display(), error = %e, "skipping crate");
                    None
                }
            })
            .collect();

        let index = SymbolIndex::build(&projects);

        let mut workspace = Workspace {
            root: canonical,
            projects,
            index,
        };
        workspace.fill_static_flags();
        Ok(workspace)
    }

    fn fill_static_flags(&mut self) {
        // Two-phase: the flag depends on inherent impls anywhere in the
        // workspace, known only once the index exists.
        let statics: Vec<String> = self
            .documents()
            .flat_map(|d| d.declarations())
            .filter(|decl| self.index.is_static_type(&decl.qualified_name))
            .map(|decl| decl.qualified_name.clone())
            .collect();
        for project in &mut self.projects {
            for doc in &mut project.documents {
                for decl in doc.declarations_mut() {
                    if statics.contains(&decl.qualified_name) {
                        decl.is_static = true;
                    }
                }
            }
        }
    }

    /// Every document of every project, in deterministic order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.projects.iter().flat_map(|p| p.documents.iter())
    }

    /// Whole-workspace reference search for one declaration.
    ///
    /// Exhaustive over every document of every project; excludes the
    /// declaration site itself and the type's own impl blocks. This is the
    /// most expensive query in the system, O(workspace size) per call.
    pub fn find_references(&self, decl: &Declaration) -> Vec<ReferenceLocation> {
        refs::find_references(self, decl)
    }
}

fn load_project(crate_root: &Path) -> ActorlintResult<Project> {
    let manifest = crate_root.join("Cargo.toml");
    let cargo_toml = fs::read_to_string(&manifest).map_err(|e| ActorlintError::io(&manifest, e))?;
    let crate_name = parse_crate_name(&cargo_toml);

    let files = gather_rs_files(crate_root).map_err(|e| {
        ActorlintError::workspace(crate_root, format!("failed to gather source files: {}", e))
    })?;

    // Syntax trees are not Send, so parsing and every later walk over them
    // stays on one thread; parallelism lives in file discovery.
    let mut documents: Vec<Document> = files
        .iter()
        .filter_map(
            |file| match parse::parse_document(&crate_name, crate_root, file) {
                ParseOutcome::Parsed(doc) => Some(doc),
                ParseOutcome::Skipped(path, reason) => {
                    warn!(path = %path.display(), reason = %reason, "skipping document");
                    None
                }
            },
        )
        .collect();

    // Deterministic document order for stable diagnostics.
    documents.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(Project {
        name: crate_name,
        root: crate_root.to_path_buf(),
        documents,
    })
}
