//! Output formatting - plaintext and JSON.

use serde_json::json;

use crate::diagnostics::Diagnostic;
use crate::model::Declaration;

/// Renders the combined analysis results in plain text format.
pub fn render_plain(unused: &[&Declaration], diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();

    if unused.is_empty() {
        out.push_str("No unused types found.\n");
    } else {
        out.push_str(&format!("UNUSED TYPES ({}):\n", unused.len()));
        for decl in unused {
            out.push_str(&format!(
                "- {} ({}:{})\n",
                decl.qualified_name,
                decl.file.display(),
                decl.span.start_line
            ));
        }
    }

    if diagnostics.is_empty() {
        out.push_str("No rule violations found.\n");
    } else {
        out.push_str(&format!("RULE VIOLATIONS ({}):\n", diagnostics.len()));
        for d in diagnostics {
            out.push_str(&format!(
                "- {}[{}] {} ({}:{}:{})\n",
                d.severity.as_str(),
                d.rule_id,
                d.message,
                d.location.file.display(),
                d.location.start_line,
                d.location.start_column
            ));
        }
    }

    out
}

/// Renders the combined analysis results as a JSON value.
pub fn render_json(unused: &[&Declaration], diagnostics: &[Diagnostic]) -> serde_json::Value {
    json!({
        "unused_types": unused.iter().map(|decl| json!({
            "name": decl.qualified_name,
            "file": decl.file.display().to_string(),
            "line": decl.span.start_line,
        })).collect::<Vec<_>>(),
        "diagnostics": diagnostics.iter().map(|d| json!({
            "rule_id": d.rule_id,
            "severity": d.severity.as_str(),
            "category": d.category,
            "message": d.message,
            "file": d.location.file.display().to_string(),
            "line": d.location.start_line,
            "column": d.location.start_column,
        })).collect::<Vec<_>>(),
        "summary": {
            "unused_types": unused.len(),
            "diagnostics": diagnostics.len(),
        },
    })
}

/// Prints the plain text report to stdout.
pub fn print_plain(unused: &[&Declaration], diagnostics: &[Diagnostic]) {
    print!("{}", render_plain(unused, diagnostics));
}

/// Prints the JSON report to stdout.
///
/// Falls back to the plain format if serialization fails (should never
/// happen with these value shapes, but handle it anyway).
pub fn print_json(unused: &[&Declaration], diagnostics: &[Diagnostic]) {
    let value = render_json(unused, diagnostics);
    match serde_json::to_string_pretty(&value) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            print_plain(unused, diagnostics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Severity, RULE_CATEGORY, SYSTEM_MESSAGE_RULE_ID};
    use crate::model::{DeclKind, SourceSpan};
    use std::path::PathBuf;

    fn sample_decl() -> Declaration {
        Declaration {
            qualified_name: "app::a::Unused".to_string(),
            simple_name: "Unused".to_string(),
            kind: DeclKind::Struct,
            namespace: "app::a".to_string(),
            file: PathBuf::from("src/a.rs"),
            span: SourceSpan {
                file: PathBuf::from("src/a.rs"),
                start_line: 3,
                start_column: 1,
                end_line: 3,
                end_column: 17,
            },
            base_type: None,
            variants: Vec::new(),
            unit_struct: true,
            is_static: false,
        }
    }

    fn sample_diag() -> Diagnostic {
        Diagnostic {
            rule_id: SYSTEM_MESSAGE_RULE_ID,
            severity: Severity::Error,
            category: RULE_CATEGORY,
            message: "bad send".to_string(),
            location: SourceSpan {
                file: PathBuf::from("src/b.rs"),
                start_line: 9,
                start_column: 5,
                end_line: 9,
                end_column: 25,
            },
        }
    }

    #[test]
    fn test_plain_empty() {
        let text = render_plain(&[], &[]);
        assert!(text.contains("No unused types found."));
        assert!(text.contains("No rule violations found."));
    }

    #[test]
    fn test_plain_with_findings() {
        let decl = sample_decl();
        let text = render_plain(&[&decl], &[sample_diag()]);
        assert!(text.contains("UNUSED TYPES (1):"));
        assert!(text.contains("app::a::Unused"));
        assert!(text.contains("error[ACTL001]"));
        assert!(text.contains("src/b.rs:9:5"));
    }

    #[test]
    fn test_json_shape() {
        let decl = sample_decl();
        let value = render_json(&[&decl], &[sample_diag()]);
        assert_eq!(value["summary"]["unused_types"], 1);
        assert_eq!(value["summary"]["diagnostics"], 1);
        assert_eq!(value["unused_types"][0]["name"], "app::a::Unused");
        assert_eq!(value["diagnostics"][0]["rule_id"], "ACTL001");
        assert_eq!(value["diagnostics"][0]["severity"], "error");
    }
}
