//! Output rendering for check, fix, migrate, and rules commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields, a top-level summary, and any per-file errors.

use crate::catalog::Rule;
use crate::fix::FixResult;
use crate::lint::CheckResult;
use crate::models::{Diagnostic, Severity};
use crate::templates::MigrationOutcome;
use crate::utils::error_prefix;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn emit_json(value: &JsonVal) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_errors(errors: &[String]) {
    for e in errors {
        eprintln!("{} {}", error_prefix(), e);
    }
}

fn paint(text: &str, color: bool, f: impl Fn(&str) -> String) -> String {
    if color {
        f(text)
    } else {
        text.to_string()
    }
}

fn diagnostic_line(file: &str, d: &Diagnostic, color: bool) -> String {
    let (icon, sev) = match d.severity {
        Severity::Error => (
            paint("✖", color, |s| s.red().to_string()),
            paint("⟦error⟧", color, |s| s.red().bold().to_string()),
        ),
        Severity::Warning => (
            paint("▲", color, |s| s.yellow().to_string()),
            paint("⟦warn⟧", color, |s| s.yellow().bold().to_string()),
        ),
    };
    let loc = format!("{}:{}:{}", file, d.line, d.column);
    let fixable = if d.is_fixable() { " (fixable)" } else { "" };
    format!(
        "{} {} {} ❲{}❳ {}{}",
        icon,
        sev,
        paint(&loc, color, |s| s.bold().to_string()),
        d.rule_id,
        d.message,
        fixable
    )
}

/// Print check results in the requested format.
pub fn print_check(res: &CheckResult, output: &str, errors: &[String]) {
    if output == "json" {
        emit_json(&compose_check_json(res, errors));
        return;
    }
    let color = use_colors(output);
    print_errors(errors);
    for f in &res.files {
        for d in &f.result.patterns {
            println!("{}", diagnostic_line(&f.file, d, color));
        }
        if f.result.has_legacy_patterns && f.result.is_valid {
            println!(
                "{} {} (legacy syntax allowed)",
                paint("◆", color, |s| s.blue().to_string()),
                f.file
            );
        }
    }
    let summary = format!(
        "Summary: errors={} warnings={} files={} invalid={}",
        res.summary.errors, res.summary.warnings, res.summary.files, res.summary.invalid
    );
    println!("{}", paint(&summary, color, |s| s.bold().to_string()));
}

/// Print rewrite results. When `write` is false, previews and diffs
/// can be emitted; otherwise only file statuses are shown.
pub fn print_fix(results: &[FixResult], output: &str, write: bool, diff: bool, errors: &[String]) {
    if output == "json" {
        emit_json(&compose_fix_json(results, write, diff, errors));
        return;
    }
    let color = use_colors(output);
    print_errors(errors);
    for r in results {
        let header = paint("---", color, |s| s.cyan().bold().to_string());
        let file = paint(&r.file, color, |s| s.bold().to_string());
        if !r.changed {
            println!("{} {}", paint("no changes:", color, |s| s.bright_black().to_string()), r.file);
        } else if write {
            println!(
                "{} {} ({} fixed, {} remaining)",
                paint("✏️  migrated:", color, |s| s.green().bold().to_string()),
                file,
                r.fixed,
                r.remaining
            );
        } else if diff {
            if let Some(d) = build_line_diff(r.original.as_deref(), r.preview.as_deref()) {
                println!("{} {}\n{}", header, file, d);
            }
        } else if let Some(prev) = &r.preview {
            println!("{} {}\n{}", header, file, prev);
        }
        if r.changed && !r.idempotent {
            println!(
                "{} {} still has fixable findings after {} pass(es)",
                paint("▲", color, |s| s.yellow().to_string()),
                r.file,
                r.passes
            );
        }
    }
}

/// Print one line per migrated template plus unresolved diagnostics.
pub fn print_migrate(outcomes: &[MigrationOutcome], output: &str, write: bool, errors: &[String]) {
    if output == "json" {
        emit_json(&compose_migrate_json(outcomes, write, errors));
        return;
    }
    let color = use_colors(output);
    print_errors(errors);
    for o in outcomes {
        let label = format!("{}#{}", o.file, o.id);
        match &o.error {
            Some(e) => {
                println!("{} {} {}", paint("✖ failed:", color, |s| s.red().bold().to_string()), label, e);
                for d in &o.diagnostics {
                    println!("    {}", diagnostic_line(&label, d, color));
                }
            }
            None if o.wrote => println!("{} {}", paint("✏️  migrated:", color, |s| s.green().bold().to_string()), label),
            None if o.changed => println!("{} {}", paint("would migrate:", color, |s| s.cyan().bold().to_string()), label),
            None => println!("{} {}", paint("up to date:", color, |s| s.bright_black().to_string()), label),
        }
    }
}

/// Print the active rule catalog.
pub fn print_rules(rules: &[Rule], output: &str) {
    if output == "json" {
        emit_json(&compose_rules_json(rules));
        return;
    }
    let color = use_colors(output);
    for r in rules {
        let fix = if r.fixable() { "fix" } else { "   " };
        println!(
            "{} {:<7} {} {}",
            paint(r.id, color, |s| s.bold().to_string()),
            r.severity.as_str(),
            fix,
            r.message
        );
    }
}

fn build_line_diff(old: Option<&str>, new: Option<&str>) -> Option<String> {
    let old: Vec<&str> = old?.lines().collect();
    let new: Vec<&str> = new?.lines().collect();
    let mut out = String::new();
    // fixes never add or remove lines, so a line-by-line pairing is enough
    for (i, (a, b)) in old.iter().zip(new.iter()).enumerate() {
        if a != b {
            out.push_str(&format!("@@ line {}\n-{}\n+{}\n", i + 1, a, b));
        }
    }
    for (i, b) in new.iter().enumerate().skip(old.len()) {
        out.push_str(&format!("@@ line {}\n+{}\n", i + 1, b));
    }
    for (i, a) in old.iter().enumerate().skip(new.len()) {
        out.push_str(&format!("@@ line {}\n-{}\n", i + 1, a));
    }
    Some(out)
}

/// Compose check JSON object (pure) for testing/snapshot purposes.
pub fn compose_check_json(res: &CheckResult, errors: &[String]) -> JsonVal {
    let mut out = serde_json::to_value(res).unwrap_or_else(|_| json!({}));
    out["errors"] = json!(errors);
    out
}

/// Compose fix JSON object (pure) for testing/snapshot purposes.
pub fn compose_fix_json(results: &[FixResult], write: bool, diff: bool, errors: &[String]) -> JsonVal {
    let items: Vec<_> = results
        .iter()
        .map(|r| {
            json!({
                "file": r.file,
                "changed": r.changed,
                "wrote": write && r.changed,
                "fixed": r.fixed,
                "remaining": r.remaining,
                "idempotent": r.idempotent,
                "passes": r.passes,
                "preview": if !write { r.preview.as_ref() } else { None },
                "diff": if diff && !write { build_line_diff(r.original.as_deref(), r.preview.as_deref()) } else { None }
            })
        })
        .collect();
    let changed = results.iter().filter(|r| r.changed).count();
    let summary = json!({
        "changed": changed,
        "total": results.len(),
        "wrote": if write { changed } else { 0 },
        "fixed": results.iter().map(|r| r.fixed).sum::<usize>(),
    });
    json!({"results": items, "summary": summary, "errors": errors})
}

/// Compose migrate JSON object (pure) for testing/snapshot purposes.
pub fn compose_migrate_json(outcomes: &[MigrationOutcome], write: bool, errors: &[String]) -> JsonVal {
    let items: Vec<_> = outcomes
        .iter()
        .map(|o| {
            json!({
                "file": o.file,
                "id": o.id,
                "changed": o.changed,
                "wrote": o.wrote,
                "error": o.error,
                "diagnostics": o.diagnostics,
            })
        })
        .collect();
    let summary = json!({
        "total": outcomes.len(),
        "migrated": outcomes.iter().filter(|o| !o.failed() && o.changed).count(),
        "failed": outcomes.iter().filter(|o| o.failed()).count(),
        "wrote": if write { outcomes.iter().filter(|o| o.wrote).count() } else { 0 },
    });
    json!({"results": items, "summary": summary, "errors": errors})
}

/// Compose rules JSON array (pure).
pub fn compose_rules_json(rules: &[Rule]) -> JsonVal {
    JsonVal::Array(
        rules
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "severity": r.severity,
                    "fixable": r.fixable(),
                    "message": r.message,
                    "pattern": r.pattern.as_str(),
                })
            })
            .collect(),
    )
}
