//! actorlint-core: static analysis for actor-based Rust codebases
//!
//! This library provides modular components for loading, indexing, and
//! analyzing Rust workspaces that use the `actor_core` messaging crate.
//!
//! # Features
//!
//! - **Unused-type detection**: Find struct/enum declarations nothing
//!   references, with name-based exclusions for entry points, namespace-only
//!   helper types, and test/spec code
//! - **Marker annotation**: Rewrite documents to prepend a TODO marker
//!   comment above each dead declaration, idempotently
//! - **Send-rule analysis**: Flag call sites that pass a system message
//!   (a type implementing `actor_core::system::SystemMessage`) to the
//!   general `tell` send operation
//! - **Textual usage fallback**: Keep types alive when their qualified name
//!   appears in other documents or in configuration files
//! - **Workspace support**: Analyze entire Cargo workspaces via
//!   `cargo metadata`, with a directory-scan fallback
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use actorlint_core::prelude::*;
//!
//! let workspace = Workspace::load(Path::new("."))?;
//! let config = load_config(&workspace.root)?;
//!
//! let detector = UnusedTypeDetector::new(&workspace, &config.unused);
//! for decl in detector.find_unused() {
//!     println!("unused type: {}", decl.qualified_name);
//! }
//!
//! for diag in check_workspace(&workspace, &config.sendrule) {
//!     println!("{}: {}", diag.rule_id, diag.message);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`model`]: Workspace/project/document program model
//! - [`parse`]: Document parsing, module paths, import maps, name resolution
//! - [`symbols`]: Workspace-wide type and impl index
//! - [`refs`]: Reference search for declarations
//! - [`calls`]: Call-site callee and message-symbol resolution
//! - [`unused`]: Unused-type detection with exclusion rules and fallbacks
//! - [`rewrite`]: Marker-comment document rewriting
//! - [`sendrule`]: The system-message send rule
//! - [`diagnostics`]: Diagnostic values and the sink contract
//! - [`scan`]: Parallel file discovery
//! - [`config`]: actorlint.toml loading
//! - [`error`]: Typed error handling

pub mod calls;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod model;
pub mod parse;
pub mod prelude;
pub mod refs;
pub mod report;
pub mod rewrite;
pub mod scan;
pub mod sendrule;
pub mod symbols;
pub mod unused;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{ActorlintError, ActorlintResult, IoResultExt};

// Configuration
pub use config::{load_config, ActorlintConfig, SendRuleConfig, UnusedConfig};

// Program model
pub use model::{
    discover_projects, DeclKind, Declaration, Document, Project, ReferenceLocation, SourceSpan,
    Workspace,
};

// Parsing
pub use parse::{parse_document, ParseOutcome};

// Symbol index
pub use symbols::{SymbolIndex, TypeEntry};

// Reference search
pub use refs::find_references;

// Call-site resolution
pub use calls::{
    implemented_interfaces, resolve_message_symbol, resolve_method_callee, resolve_static_callee,
    LocalTypes, MessageSymbol,
};

// Unused-type detection
pub use unused::{exclusion_rules, ExclusionRule, TextualUsage, UnusedTypeDetector};

// Document rewriting
pub use rewrite::{insert_markers, RewriteOutcome, UNUSED_TYPE_MARKER};

// Send rule
pub use sendrule::{check_document, check_workspace};

// Diagnostics
pub use diagnostics::{
    sort_diagnostics, system_message_text, Diagnostic, DiagnosticSink, Severity, RULE_CATEGORY,
    SYSTEM_MESSAGE_DEFAULT_SEVERITY, SYSTEM_MESSAGE_RULE_ID,
};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Reporting
pub use report::{print_json, print_plain, render_json, render_plain};

// File scanning
pub use scan::{gather_config_files, gather_crate_roots, gather_rs_files};
