//! Unused-type detection and annotation.
//!
//! A declaration is dead when no exclusion rule claims it, the reference
//! search finds nothing, and its qualified name appears in no other
//! document and no configuration file. Every stage is biased toward
//! liveness: exclusions are name heuristics, the textual fallback is a raw
//! substring scan, and unreadable fallback files are treated as
//! inconclusive rather than as evidence of death.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::UnusedConfig;
use crate::model::{Declaration, Document, Workspace};
use crate::rewrite::{insert_markers, RewriteOutcome};
use crate::scan::gather_config_files;

/// One reason a declaration is exempt from unused detection.
///
/// Rules are evaluated in order; the first hit wins. All marker matching is
/// ASCII case-insensitive substring containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Namespace-only types (unit struct, associated functions only).
    IsStatic,
    /// The conventional entry-point type, by simple name.
    IsEntryPoint(String),
    /// Marker appears in the type's own name or its base type's name.
    NameContainsMarker(String),
    /// Marker appears in the declaring namespace path.
    NamespaceContainsMarker(String),
}

impl ExclusionRule {
    pub fn excludes(&self, decl: &Declaration) -> bool {
        match self {
            ExclusionRule::IsStatic => decl.is_static,
            ExclusionRule::IsEntryPoint(name) => decl.simple_name == *name,
            ExclusionRule::NameContainsMarker(marker) => {
                contains_marker(&decl.simple_name, marker)
                    || decl
                        .base_type_name()
                        .is_some_and(|base| contains_marker(base, marker))
            }
            ExclusionRule::NamespaceContainsMarker(marker) => {
                contains_marker(&decl.namespace, marker)
            }
        }
    }
}

/// The ordered rule set for a given configuration.
pub fn exclusion_rules(cfg: &UnusedConfig) -> Vec<ExclusionRule> {
    let mut rules = vec![
        ExclusionRule::IsStatic,
        ExclusionRule::IsEntryPoint(cfg.entry_point.clone()),
    ];
    for marker in &cfg.markers {
        rules.push(ExclusionRule::NameContainsMarker(marker.clone()));
        rules.push(ExclusionRule::NamespaceContainsMarker(marker.clone()));
    }
    rules
}

fn contains_marker(haystack: &str, marker: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&marker.to_ascii_lowercase())
}

/// Cached text of the configuration files reachable from the workspace
/// root. Files that cannot be read are logged and skipped, never counted as
/// evidence either way.
#[derive(Debug, Default)]
pub struct TextualUsage {
    config_texts: Vec<String>,
}

impl TextualUsage {
    pub fn load(root: &Path, extensions: &[String]) -> Self {
        let mut config_texts = Vec::new();
        for path in gather_config_files(root, extensions) {
            match fs::read_to_string(&path) {
                Ok(text) => config_texts.push(text),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable configuration file, ignored by the usage scan");
                }
            }
        }
        Self { config_texts }
    }

    fn appears_in_config(&self, qualified_name: &str) -> bool {
        self.config_texts.iter().any(|t| t.contains(qualified_name))
    }
}

/// The unused-type detector over one workspace snapshot.
pub struct UnusedTypeDetector<'a> {
    workspace: &'a Workspace,
    rules: Vec<ExclusionRule>,
    fallback: TextualUsage,
}

impl<'a> UnusedTypeDetector<'a> {
    pub fn new(workspace: &'a Workspace, cfg: &UnusedConfig) -> Self {
        Self {
            workspace,
            rules: exclusion_rules(cfg),
            fallback: TextualUsage::load(&workspace.root, &cfg.config_extensions),
        }
    }

    /// Whether `decl` is dead. Stages in order: exclusion rules, reference
    /// count, textual fallback; the first liveness signal short-circuits.
    pub fn is_unused(&self, decl: &Declaration) -> bool {
        if self.rules.iter().any(|rule| rule.excludes(decl)) {
            return false;
        }
        if !self.workspace.find_references(decl).is_empty() {
            return false;
        }
        !self.used_textually(decl)
    }

    fn used_textually(&self, decl: &Declaration) -> bool {
        let sibling_hit = self
            .workspace
            .documents()
            .filter(|doc| doc.path != decl.file)
            .any(|doc| doc.text.contains(&decl.qualified_name));
        sibling_hit || self.fallback.appears_in_config(&decl.qualified_name)
    }

    /// Dead declarations of one document, in source order.
    pub fn find_unused_in(&self, doc: &'a Document) -> Vec<&'a Declaration> {
        doc.declarations()
            .iter()
            .filter(|decl| self.is_unused(decl))
            .collect()
    }

    /// Dead declarations across the whole workspace, in document order.
    pub fn find_unused(&self) -> Vec<&'a Declaration> {
        self.workspace
            .documents()
            .flat_map(|doc| self.find_unused_in(doc))
            .collect()
    }

    /// Rewritten text of `doc` with markers above its dead declarations.
    pub fn annotate(&self, doc: &'a Document) -> RewriteOutcome {
        let dead = self.find_unused_in(doc);
        insert_markers(&doc.text, &dead)
    }

    /// Annotate every document. Order follows the model's document order.
    pub fn annotate_workspace(&self) -> Vec<(PathBuf, RewriteOutcome)> {
        self.workspace
            .documents()
            .map(|doc| (doc.path.clone(), self.annotate(doc)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnusedConfig;
    use crate::model::{DeclKind, SourceSpan};
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn fixture_workspace(files: &[(&str, &str)], extras: &[(&str, &str)]) -> (PathBuf, Workspace) {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("actorlint_unused_test")
            .join(format!("{}_{}", std::process::id(), id));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"app\"").unwrap();
        for (name, content) in files {
            let path = dir.join("src").join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
        }
        for (name, content) in extras {
            fs::write(dir.join(name), content).unwrap();
        }
        let ws = Workspace::load(&dir).unwrap();
        (dir, ws)
    }

    fn make_decl(simple: &str, namespace: &str) -> Declaration {
        Declaration {
            qualified_name: format!("{}::{}", namespace, simple),
            simple_name: simple.to_string(),
            kind: DeclKind::Struct,
            namespace: namespace.to_string(),
            file: PathBuf::from("lib.rs"),
            span: SourceSpan {
                file: PathBuf::from("lib.rs"),
                start_line: 1,
                start_column: 1,
                end_line: 1,
                end_column: 10,
            },
            base_type: None,
            variants: Vec::new(),
            unit_struct: false,
            is_static: false,
        }
    }

    #[test]
    fn test_exclusion_static() {
        let mut decl = make_decl("Helpers", "app");
        assert!(!ExclusionRule::IsStatic.excludes(&decl));
        decl.is_static = true;
        assert!(ExclusionRule::IsStatic.excludes(&decl));
    }

    #[test]
    fn test_exclusion_entry_point() {
        let rule = ExclusionRule::IsEntryPoint("Program".to_string());
        assert!(rule.excludes(&make_decl("Program", "app")));
        assert!(!rule.excludes(&make_decl("Programmer", "app")));
    }

    #[test]
    fn test_exclusion_name_marker_is_case_insensitive() {
        let rule = ExclusionRule::NameContainsMarker("Test".to_string());
        assert!(rule.excludes(&make_decl("IntegrationTESTHarness", "app")));
        assert!(!rule.excludes(&make_decl("Worker", "app")));
    }

    #[test]
    fn test_exclusion_base_type_marker() {
        let rule = ExclusionRule::NameContainsMarker("Spec".to_string());
        let mut decl = make_decl("Wrapper", "app");
        decl.base_type = Some("app::harness::SpecKit".to_string());
        assert!(rule.excludes(&decl));
    }

    #[test]
    fn test_exclusion_namespace_marker() {
        let rule = ExclusionRule::NamespaceContainsMarker("test".to_string());
        assert!(rule.excludes(&make_decl("Worker", "app::tests::helpers")));
        assert!(!rule.excludes(&make_decl("Worker", "app::workers")));
    }

    #[test]
    fn test_rule_set_shape() {
        let rules = exclusion_rules(&UnusedConfig::default());
        // IsStatic, IsEntryPoint, then name+namespace per marker
        assert_eq!(rules.len(), 6);
        assert_eq!(rules[0], ExclusionRule::IsStatic);
    }

    #[test]
    fn test_two_document_scenario() {
        let (dir, ws) = fixture_workspace(
            &[
                ("lib.rs", "pub mod a;\npub mod b;\n"),
                ("a.rs", "pub struct Unused;\npub struct Used;\n"),
                (
                    "b.rs",
                    "use crate::a::Used;\npub fn consume(_u: Used) {}\n",
                ),
            ],
            &[],
        );
        let detector = UnusedTypeDetector::new(&ws, &UnusedConfig::default());
        let unused: Vec<&str> = detector
            .find_unused()
            .iter()
            .map(|d| d.qualified_name.as_str())
            .collect();
        assert_eq!(unused, vec!["app::a::Unused"]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_mention_keeps_type_alive() {
        let (dir, ws) = fixture_workspace(
            &[
                ("lib.rs", "pub mod a;\n"),
                ("a.rs", "pub struct Serializer;\n"),
            ],
            &[("app.conf", "serializer-class = \"app::a::Serializer\"\n")],
        );
        let detector = UnusedTypeDetector::new(&ws, &UnusedConfig::default());
        assert!(detector.find_unused().is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sibling_text_mention_keeps_type_alive() {
        let (dir, ws) = fixture_workspace(
            &[
                ("lib.rs", "pub mod a;\npub mod b;\n"),
                ("a.rs", "pub struct Reflected;\n"),
                ("b.rs", "// loaded dynamically as app::a::Reflected\n"),
            ],
            &[],
        );
        let detector = UnusedTypeDetector::new(&ws, &UnusedConfig::default());
        assert!(detector.find_unused().is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_annotate_inserts_marker_and_is_idempotent() {
        let (dir, ws) = fixture_workspace(
            &[("lib.rs", "pub mod a;\n"), ("a.rs", "pub struct Dead;\n")],
            &[],
        );
        let detector = UnusedTypeDetector::new(&ws, &UnusedConfig::default());
        let doc = ws
            .documents()
            .find(|d| d.path.ends_with("a.rs"))
            .unwrap();
        let outcome = detector.annotate(doc);
        let text = outcome.text().unwrap().to_string();
        assert!(text.starts_with(crate::rewrite::UNUSED_TYPE_MARKER));

        // apply and re-run: nothing left to do
        fs::write(&doc.path, &text).unwrap();
        let ws2 = Workspace::load(&dir).unwrap();
        let detector2 = UnusedTypeDetector::new(&ws2, &UnusedConfig::default());
        let doc2 = ws2
            .documents()
            .find(|d| d.path.ends_with("a.rs"))
            .unwrap();
        assert_eq!(detector2.annotate(doc2), RewriteOutcome::Unchanged);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_entry_point_not_annotated() {
        let (dir, ws) = fixture_workspace(&[("lib.rs", "pub struct Program;\n")], &[]);
        let detector = UnusedTypeDetector::new(&ws, &UnusedConfig::default());
        assert!(detector.find_unused().is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_static_type_not_annotated() {
        let (dir, ws) = fixture_workspace(
            &[(
                "lib.rs",
                "pub struct MathUtils;\nimpl MathUtils { pub fn add(a: u32, b: u32) -> u32 { a + b } }\n",
            )],
            &[],
        );
        let detector = UnusedTypeDetector::new(&ws, &UnusedConfig::default());
        assert!(detector.find_unused().is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
