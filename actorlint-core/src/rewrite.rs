//! Document rewriting: prepend the unused-type marker comment.
//!
//! Edits for one document are computed from one coherent read of its
//! declarations and applied bottom-up as a single batch, so earlier spans
//! stay valid while later lines shift. The commit step re-parses the
//! rewritten text; if that fails for any reason the document is returned
//! unchanged, a typed and recoverable outcome rather than an error.

use crate::model::Declaration;

/// Marker comment inserted above a declaration judged unused.
pub const UNUSED_TYPE_MARKER: &str = "/*TODO: this type is not used*/";

/// Result of applying annotation edits to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// All edits committed; the new document text.
    Rewritten(String),
    /// Nothing to do, or the batch failed to commit (degrade to no-op).
    Unchanged,
}

impl RewriteOutcome {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, RewriteOutcome::Rewritten(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            RewriteOutcome::Rewritten(text) => Some(text),
            RewriteOutcome::Unchanged => None,
        }
    }
}

/// Insert the marker comment above each of `dead` in `text`.
///
/// Declarations already carrying the marker on the preceding line are
/// skipped, which makes repeated runs idempotent. A declaration whose span
/// no longer maps into the text, or a rewrite that no longer parses,
/// aborts the whole batch for this document only.
pub fn insert_markers(text: &str, dead: &[&Declaration]) -> RewriteOutcome {
    if dead.is_empty() {
        return RewriteOutcome::Unchanged;
    }

    let had_trailing_newline = text.ends_with('\n');
    let mut lines: Vec<String> = text.lines().map(String::from).collect();

    // Bottom-up keeps line numbers of the remaining targets stable.
    let mut start_lines: Vec<usize> = dead.iter().map(|d| d.span.start_line).collect();
    start_lines.sort_unstable();
    start_lines.dedup();
    start_lines.reverse();

    let mut inserted = false;
    for line in start_lines {
        let idx = line.checked_sub(1).unwrap_or(usize::MAX);
        if idx >= lines.len() {
            // stale span; refuse the whole batch rather than guess
            return RewriteOutcome::Unchanged;
        }
        if idx > 0 && lines[idx - 1].contains(UNUSED_TYPE_MARKER) {
            continue;
        }
        let indent: String = lines[idx]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        lines.insert(idx, format!("{}{}", indent, UNUSED_TYPE_MARKER));
        inserted = true;
    }

    if !inserted {
        return RewriteOutcome::Unchanged;
    }

    let mut new_text = lines.join("\n");
    if had_trailing_newline {
        new_text.push('\n');
    }

    // Commit: the rewritten document must still be structurally identical
    // modulo the inserted trivia, i.e. it must still parse.
    match syn::parse_file(&new_text) {
        Ok(_) => RewriteOutcome::Rewritten(new_text),
        Err(_) => RewriteOutcome::Unchanged,
    }
}
