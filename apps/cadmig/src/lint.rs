//! Lint runner for the `check` command.
//!
//! Contract sources are validated as a whole. Host documents (JS/TS) are
//! validated through their template-literal fragments, so only embedded
//! contract code is inspected. Produces a `CheckResult` with per-file
//! verdicts and a summary.

use crate::config::Effective;
use crate::engine::Engine;
use crate::fragments::template_literals;
use crate::models::{ScanResult, Severity, Summary, ValidateOptions};
use crate::utils::{collect_targets, display_path, is_host_document, read_source};
use crate::validate::{validate, validate_fragments};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize, Debug, Clone)]
/// Verdict for one file.
pub struct FileReport {
    pub file: String,
    pub host: bool,
    #[serde(flatten)]
    pub result: ScanResult,
}

#[derive(Serialize, Debug, Clone)]
/// Check results container.
pub struct CheckResult {
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

/// Validate every file matched by `include` and `hosts`.
///
/// Returns the result and the per-file errors (unreadable files, bad
/// globs); a file with an error is left out of the result.
pub fn run_check(eff: &Effective, engine: &Engine) -> (CheckResult, Vec<String>) {
    let options = ValidateOptions {
        allow_legacy_syntax: eff.allow_legacy_syntax,
    };
    let (sources, mut errors) = collect_targets(&eff.repo_root, &eff.include);
    let (hosts, host_errors) = collect_targets(&eff.repo_root, &eff.hosts);
    errors.extend(host_errors);

    let mut targets: Vec<(PathBuf, bool)> = sources
        .into_iter()
        .map(|p| {
            let host = is_host_document(&p);
            (p, host)
        })
        .collect();
    for h in hosts {
        if !targets.iter().any(|(p, _)| *p == h) {
            targets.push((h, true));
        }
    }

    let per_file: Vec<Result<FileReport, String>> = targets
        .par_iter()
        .map(|(path, host)| check_file(&eff.repo_root, path, *host, engine, options))
        .collect();

    let mut files = Vec::new();
    for r in per_file {
        match r {
            Ok(f) => files.push(f),
            Err(e) => errors.push(e),
        }
    }
    // Deterministic ordering by file
    files.sort_by(|a, b| a.file.cmp(&b.file));
    let summary = summarize(&files);
    (CheckResult { files, summary }, errors)
}

fn check_file(
    root: &Path,
    path: &Path,
    host: bool,
    engine: &Engine,
    options: ValidateOptions,
) -> Result<FileReport, String> {
    let text = read_source(path).map_err(|e| e.to_string())?;
    let result = if host {
        validate_fragments(engine, &text, &template_literals(&text), options)
    } else {
        validate(engine, &text, options)
    };
    Ok(FileReport {
        file: display_path(root, path),
        host,
        result,
    })
}

fn summarize(files: &[FileReport]) -> Summary {
    let mut summary = Summary {
        files: files.len(),
        ..Default::default()
    };
    for f in files {
        if !f.result.is_valid {
            summary.invalid += 1;
        }
        for d in &f.result.patterns {
            match d.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
        }
    }
    summary
}
