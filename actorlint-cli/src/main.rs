//! actorlint CLI - unused-type and send-rule analysis for actor codebases.
//!
//! Features:
//! - Workspace-aware loading (cargo metadata with directory-scan fallback)
//! - Unused-type detection with marker-comment annotation (`--write`)
//! - System-message send-rule diagnostics (ACTL001)
//! - Plain text or JSON output
//! - CI-friendly exit codes

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;

use actorlint_core::{
    check_workspace, init_structured_logging, load_config, log_error, log_info, log_warn,
    print_json, print_plain, ActorlintConfig, Diagnostic, RewriteOutcome, Severity,
    UnusedTypeDetector, Workspace,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Unused-type and send-rule analyzer for actor-based Rust")]
pub struct Cli {
    /// Path to the root of the workspace to analyze
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Write marker annotations above unused types back to disk
    #[arg(long)]
    write: bool,

    /// Skip the unused-type detector
    #[arg(long)]
    no_unused: bool,

    /// Skip the send-rule analyzer
    #[arg(long)]
    no_sendrule: bool,
}

/// Whether any finding should fail the run.
fn has_failures(unused_count: usize, diagnostics: &[Diagnostic]) -> bool {
    unused_count > 0 || diagnostics.iter().any(|d| d.severity >= Severity::Error)
}

fn main() -> Result<()> {
    // Global panic guard
    std::panic::set_hook(Box::new(|info| {
        log_error(&format!("internal panic: {}", info));
        eprintln!("[PANIC] actorlint internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Load config from actorlint.toml if present (don't fail on config errors)
    let root = Path::new(&cli.path);
    let config = match load_config(root) {
        Ok(cfg) => cfg,
        Err(e) => {
            log_warn(&format!("config load failed, using defaults: {}", e));
            ActorlintConfig::default()
        }
    };

    // 2. Load and index the workspace
    let workspace = Workspace::load(root)
        .with_context(|| format!("Failed to load workspace from: {}", cli.path))?;

    // 3. Unused-type detection
    let detector = UnusedTypeDetector::new(&workspace, &config.unused);
    let unused = if cli.no_unused {
        Vec::new()
    } else {
        detector.find_unused()
    };

    // 4. Apply annotations when requested
    if cli.write && !cli.no_unused {
        for (path, outcome) in detector.annotate_workspace() {
            if let RewriteOutcome::Rewritten(text) = outcome {
                fs::write(&path, text)
                    .with_context(|| format!("Failed to rewrite {}", path.display()))?;
                eprintln!("[actorlint] annotated {}", path.display());
            }
        }
    }

    // 5. Send-rule analysis
    let diagnostics = if cli.no_sendrule {
        Vec::new()
    } else {
        check_workspace(&workspace, &config.sendrule)
    };

    log_info(&format!(
        "analysis complete: {} unused types, {} diagnostics",
        unused.len(),
        diagnostics.len()
    ));

    // 6. Report results
    if cli.json {
        print_json(&unused, &diagnostics);
    } else {
        print_plain(&unused, &diagnostics);
    }

    // 7. Exit code (CI-friendly)
    std::process::exit(if has_failures(unused.len(), &diagnostics) {
        1
    } else {
        0
    });
}
