//! Rewrite runner for the `fix` command.
//!
//! Applies catalog fixes to contract sources, up to `max_passes` passes
//! per file. Host documents are not rewritten: their template literals
//! are only checked. A file whose fixes conflict is reported as an error
//! and left untouched.

use crate::config::Effective;
use crate::engine::Engine;
use crate::rewrite::rewrite_until_stable;
use crate::utils::{collect_targets, display_path, is_host_document, read_source};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FixResult {
    pub file: String,
    pub changed: bool,
    pub fixed: usize,
    pub remaining: usize,
    pub idempotent: bool,
    pub passes: usize,
    pub preview: Option<String>,
    pub original: Option<String>,
}

/// Rewrite contract sources matched by `include`.
///
/// When `write` is true changed files are written in place. Otherwise
/// each changed file carries a preview; `capture_old` also keeps the
/// original text for diffs.
pub fn run_fix(
    eff: &Effective,
    engine: &Engine,
    write: bool,
    capture_old: bool,
) -> (Vec<FixResult>, Vec<String>) {
    let (targets, mut errors) = collect_targets(&eff.repo_root, &eff.include);
    let per_file: Vec<Result<FixResult, String>> = targets
        .par_iter()
        .filter(|p| !is_host_document(p))
        .map(|path| fix_file(&eff.repo_root, path, engine, eff.max_passes, write, capture_old))
        .collect();
    let mut results = Vec::new();
    for r in per_file {
        match r {
            Ok(f) => results.push(f),
            Err(e) => errors.push(e),
        }
    }
    results.sort_by(|a, b| a.file.cmp(&b.file));
    (results, errors)
}

fn fix_file(
    root: &Path,
    path: &Path,
    engine: &Engine,
    max_passes: usize,
    write: bool,
    capture_old: bool,
) -> Result<FixResult, String> {
    let file = display_path(root, path);
    let data = read_source(path).map_err(|e| e.to_string())?;
    let (res, passes) = rewrite_until_stable(engine, &data, max_passes)
        .map_err(|conflict| format!("{}: {}", file, conflict))?;
    let changed = res.code != data;
    if changed && write {
        fs::write(path, &res.code).map_err(|e| format!("{}: write failed: {}", file, e))?;
    }
    Ok(FixResult {
        file,
        changed,
        fixed: res.fixed.len(),
        remaining: res.remaining.len(),
        idempotent: res.idempotent,
        passes,
        preview: if changed && !write { Some(res.code) } else { None },
        original: if capture_old { Some(data) } else { None },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_effective, Overrides};
    use tempfile::tempdir;

    fn setup(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        for (name, body) in files {
            let p = dir.path().join(name);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, body).unwrap();
        }
        dir
    }

    fn effective(dir: &tempfile::TempDir) -> Effective {
        resolve_effective(&Overrides {
            repo_root: dir.path().to_str(),
            ..Default::default()
        })
    }

    #[test]
    fn test_preview_without_write() {
        let dir = setup(&[("a.cdc", "pub fun f() {}\n"), ("b.cdc", "access(all) fun g() {}\n")]);
        let (results, errors) = run_fix(&effective(&dir), &Engine::default(), false, true);
        assert!(errors.is_empty());
        assert_eq!(results.len(), 2);
        assert!(results[0].changed);
        assert_eq!(results[0].preview.as_deref(), Some("access(all) fun f() {}\n"));
        assert_eq!(results[0].original.as_deref(), Some("pub fun f() {}\n"));
        assert!(!results[1].changed);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.cdc")).unwrap(),
            "pub fun f() {}\n"
        );
    }

    #[test]
    fn test_write_updates_files() {
        let dir = setup(&[("c/a.cdc", "priv let x: Int\n")]);
        let (results, _) = run_fix(&effective(&dir), &Engine::default(), true, false);
        assert!(results[0].changed);
        assert!(results[0].preview.is_none());
        assert_eq!(
            fs::read_to_string(dir.path().join("c/a.cdc")).unwrap(),
            "access(self) let x: Int\n"
        );
    }

    #[test]
    fn test_host_documents_are_skipped() {
        let dir = setup(&[("t.ts", "const x = `pub fun f() {}`;")]);
        let mut eff = effective(&dir);
        eff.include = vec!["*.ts".into()];
        let (results, errors) = run_fix(&eff, &Engine::default(), true, false);
        assert!(results.is_empty());
        assert!(errors.is_empty());
    }
}
