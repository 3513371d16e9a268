//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use actorlint_core::prelude::*;
//! ```
//!
//! This provides the most commonly needed types for running both analyses
//! without polluting the namespace with rarely-used items.

// Core analysis types
pub use crate::error::{ActorlintError, ActorlintResult};
pub use crate::model::{Declaration, Document, Project, Workspace};

// Configuration
pub use crate::config::{load_config, ActorlintConfig};

// Unused-type detection and annotation
pub use crate::rewrite::RewriteOutcome;
pub use crate::unused::UnusedTypeDetector;

// Send rule
pub use crate::diagnostics::{Diagnostic, Severity};
pub use crate::sendrule::check_workspace;

// Reporting
pub use crate::report::{print_json, print_plain};
