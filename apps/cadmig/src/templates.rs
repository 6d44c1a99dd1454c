//! Template migration runner for the `migrate` command.
//!
//! Each matched JSON file holds one template record or an array of them.
//! Records are migrated independently; a file is rewritten only when
//! `write` is set and every record in it migrated successfully.

use crate::engine::Engine;
use crate::error::{InputError, MigrateError};
use crate::logging::Logger;
use crate::migrate::Migrator;
use crate::models::template::Template;
use crate::models::Diagnostic;
use crate::utils::{collect_targets, display_path, read_source};
use rayon::prelude::*;
use serde_json::Value as Json;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub file: String,
    pub id: String,
    pub changed: bool,
    pub wrote: bool,
    pub error: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MigrationOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Migrate every template record found under `patterns`.
pub fn run_migrate(
    root: &Path,
    patterns: &[String],
    engine: &Engine,
    logger: &dyn Logger,
    max_passes: usize,
    write: bool,
) -> (Vec<MigrationOutcome>, Vec<String>) {
    let (targets, mut errors) = collect_targets(root, patterns);
    let migrator = Migrator::new(engine, logger).with_max_passes(max_passes);
    let per_file: Vec<Result<Vec<MigrationOutcome>, String>> = targets
        .par_iter()
        .map(|path| migrate_file(root, path, &migrator, write))
        .collect();
    let mut outcomes = Vec::new();
    for r in per_file {
        match r {
            Ok(mut o) => outcomes.append(&mut o),
            Err(e) => errors.push(e),
        }
    }
    outcomes.sort_by(|a, b| a.file.cmp(&b.file).then(a.id.cmp(&b.id)));
    (outcomes, errors)
}

/// Parse a template file: a single record or an array of records.
pub fn load_templates(path: &Path) -> Result<(Vec<Template>, bool), InputError> {
    let text = read_source(path)?;
    let value: Json = serde_json::from_str(&text).map_err(|source| InputError::Template {
        path: path.to_path_buf(),
        source,
    })?;
    let is_array = value.is_array();
    let templates = if is_array {
        serde_json::from_value::<Vec<Template>>(value)
    } else {
        serde_json::from_value::<Template>(value).map(|t| vec![t])
    }
    .map_err(|source| InputError::Template {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((templates, is_array))
}

fn migrate_file(
    root: &Path,
    path: &Path,
    migrator: &Migrator<'_>,
    write: bool,
) -> Result<Vec<MigrationOutcome>, String> {
    let file = display_path(root, path);
    let (templates, is_array) = load_templates(path).map_err(|e| e.to_string())?;
    let mut migrated = Vec::with_capacity(templates.len());
    let mut outcomes = Vec::with_capacity(templates.len());
    for t in &templates {
        match migrator.migrate_template(t) {
            Ok(new) => {
                outcomes.push(MigrationOutcome {
                    file: file.clone(),
                    id: t.id.clone(),
                    changed: new.code != t.code,
                    wrote: false,
                    error: None,
                    diagnostics: Vec::new(),
                });
                migrated.push(new);
            }
            Err(e) => {
                let diagnostics = match &e {
                    MigrateError::ValidationFailed { diagnostics } => diagnostics.clone(),
                    MigrateError::PatternConflict(_) => Vec::new(),
                };
                outcomes.push(MigrationOutcome {
                    file: file.clone(),
                    id: t.id.clone(),
                    changed: false,
                    wrote: false,
                    error: Some(e.to_string()),
                    diagnostics,
                });
            }
        }
    }

    let all_ok = outcomes.iter().all(|o| !o.failed());
    let any_changed = outcomes.iter().any(|o| o.changed);
    if write && all_ok && any_changed {
        let value = if is_array {
            serde_json::to_value(&migrated)
        } else {
            serde_json::to_value(&migrated[0])
        }
        .map_err(|e| format!("{}: {}", file, e))?;
        let mut body = serde_json::to_string_pretty(&value).map_err(|e| format!("{}: {}", file, e))?;
        body.push('\n');
        fs::write(path, body).map_err(|e| format!("{}: write failed: {}", file, e))?;
        for o in outcomes.iter_mut().filter(|o| o.changed) {
            o.wrote = true;
        }
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullLogger;
    use tempfile::tempdir;

    const GOOD: &str = r#"{
  "id": "setup",
  "name": "Setup vault",
  "code": "transaction { prepare(signer: &Account) { signer.save(<-v, to: /storage/v) } }",
  "tags": ["vault"]
}"#;

    #[test]
    fn test_migrate_writes_and_keeps_metadata() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("setup.json");
        fs::write(&p, GOOD).unwrap();
        let (outcomes, errors) = run_migrate(
            dir.path(),
            &["*.json".into()],
            &Engine::default(),
            &NullLogger,
            3,
            true,
        );
        assert!(errors.is_empty());
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].wrote);
        let (saved, is_array) = load_templates(&p).unwrap();
        assert!(!is_array);
        assert!(saved[0].code.contains("signer.storage.save("));
        assert_eq!(saved[0].metadata["name"], "Setup vault");
        assert_eq!(saved[0].metadata["tags"][0], "vault");
        assert!(saved[0].metadata.contains_key("migratedAt"));
        // record fields first, then metadata in file order
        let keys: Vec<_> = fs::read_to_string(&p)
            .unwrap()
            .lines()
            .filter_map(|l| l.trim().strip_prefix('"').and_then(|r| r.split('"').next()).map(String::from))
            .collect();
        assert_eq!(&keys[..4], &["id", "code", "name", "tags"]);
    }

    #[test]
    fn test_failed_record_blocks_write() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("many.json");
        let body = r#"[
  {"id": "ok", "code": "pub fun f() {}"},
  {"id": "bad", "code": "fun f(a: AuthAccount) {}"}
]"#;
        fs::write(&p, body).unwrap();
        let (outcomes, errors) = run_migrate(
            dir.path(),
            &["*.json".into()],
            &Engine::default(),
            &NullLogger,
            3,
            true,
        );
        assert!(errors.is_empty());
        assert_eq!(outcomes.len(), 2);
        let bad = outcomes.iter().find(|o| o.id == "bad").unwrap();
        assert!(bad.failed());
        assert_eq!(bad.diagnostics[0].rule_id, "legacy-account-type");
        assert!(outcomes.iter().all(|o| !o.wrote));
        assert_eq!(fs::read_to_string(&p).unwrap(), body);
    }

    #[test]
    fn test_malformed_template_is_input_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.json"), r#"{"id": 1}"#).unwrap();
        let (outcomes, errors) = run_migrate(
            dir.path(),
            &["*.json".into()],
            &Engine::default(),
            &NullLogger,
            3,
            false,
        );
        assert!(outcomes.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("not a template record"));
    }
}
