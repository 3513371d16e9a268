//! Diagnostic values and the sink contract.
//!
//! A [`Diagnostic`] is a terminal, immutable value: rule id, severity,
//! category, formatted message, and source location. Sinks are append-only
//! and order-insensitive; deterministic ordering is applied at reporting
//! time via [`sort_diagnostics`].

use crate::model::SourceSpan;

/// Rule id for "system message routed through the general send operation".
pub const SYSTEM_MESSAGE_RULE_ID: &str = "ACTL001";

/// Diagnostic category shared by all rules of this analyzer.
pub const RULE_CATEGORY: &str = "Usage";

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Nominal severity of the system-message rule. Individual emissions may
/// escalate above this.
pub const SYSTEM_MESSAGE_DEFAULT_SEVERITY: Severity = Severity::Warning;

/// Message template of the system-message rule; one parameter, the display
/// string of the offending message symbol.
pub fn system_message_text(symbol: &str) -> String {
    format!(
        "system message `{}` must not be passed to the general send operation; use the dedicated system channel",
        symbol
    )
}

/// A structured finding of the call-site rule analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub category: &'static str,
    pub message: String,
    pub location: SourceSpan,
}

/// Append-only output channel for diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Deterministic order: file, then position.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        (&a.location.file, a.location.start_line, a.location.start_column).cmp(&(
            &b.location.file,
            b.location.start_line,
            b.location.start_column,
        ))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn span(file: &str, line: usize) -> SourceSpan {
        SourceSpan {
            file: PathBuf::from(file),
            start_line: line,
            start_column: 1,
            end_line: line,
            end_column: 2,
        }
    }

    #[test]
    fn test_sink_appends() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic {
            rule_id: SYSTEM_MESSAGE_RULE_ID,
            severity: Severity::Error,
            category: RULE_CATEGORY,
            message: system_message_text("app::Quit"),
            location: span("a.rs", 3),
        });
        assert_eq!(sink.len(), 1);
        assert!(sink[0].message.contains("app::Quit"));
    }

    #[test]
    fn test_sort_is_by_file_then_position() {
        let mut diags = vec![
            Diagnostic {
                rule_id: SYSTEM_MESSAGE_RULE_ID,
                severity: Severity::Warning,
                category: RULE_CATEGORY,
                message: String::new(),
                location: span("b.rs", 1),
            },
            Diagnostic {
                rule_id: SYSTEM_MESSAGE_RULE_ID,
                severity: Severity::Warning,
                category: RULE_CATEGORY,
                message: String::new(),
                location: span("a.rs", 9),
            },
        ];
        sort_diagnostics(&mut diags);
        assert!(diags[0].location.file.ends_with("a.rs"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > SYSTEM_MESSAGE_DEFAULT_SEVERITY);
        assert_eq!(Severity::Error.as_str(), "error");
    }
}
