//! Migration orchestrator for template bodies.
//!
//! Produces a candidate body (rewriter output, or a hand-authored body
//! supplied by the caller), validates it strictly, and returns a fresh
//! `Template` on success. The caller's template is only borrowed. Each
//! stage emits a record through the injected `Logger`; logger failures
//! are swallowed at the call site.

use crate::engine::Engine;
use crate::error::MigrateError;
use crate::logging::Logger;
use crate::models::template::Template;
use crate::models::ValidateOptions;
use crate::rewrite::{rewrite_until_stable, MAX_PASSES};
use crate::validate::validate;
use serde_json::{json, Map, Value as Json};
use std::time::Instant;

/// Syntax version stamped on migrated templates.
pub const SYNTAX_VERSION: &str = "1.0";

pub struct Migrator<'a> {
    engine: &'a Engine,
    logger: &'a dyn Logger,
    max_passes: usize,
}

impl<'a> Migrator<'a> {
    pub fn new(engine: &'a Engine, logger: &'a dyn Logger) -> Self {
        Self {
            engine,
            logger,
            max_passes: MAX_PASSES,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Rewrite the template body and accept it if it validates clean.
    pub fn migrate_template(&self, template: &Template) -> Result<Template, MigrateError> {
        let started = Instant::now();
        let found = self.engine.diagnose(&template.code);
        self.info(
            "scan",
            json!({
                "templateId": template.id,
                "found": found.len(),
                "fixable": found.iter().filter(|d| d.is_fixable()).count(),
                "elapsedMs": ms(started),
            }),
        );
        if found.is_empty() {
            return self.accept(template, template.code.clone(), started);
        }

        let rewrite_started = Instant::now();
        let (result, passes) = match rewrite_until_stable(self.engine, &template.code, self.max_passes) {
            Ok(r) => r,
            Err(conflict) => {
                self.error(
                    "rewrite",
                    json!({
                        "templateId": template.id,
                        "error": conflict.to_string(),
                        "elapsedMs": ms(rewrite_started),
                    }),
                );
                return Err(conflict.into());
            }
        };
        self.info(
            "rewrite",
            json!({
                "templateId": template.id,
                "fixed": result.fixed.len(),
                "remaining": result.remaining.len(),
                "passes": passes,
                "idempotent": result.idempotent,
                "elapsedMs": ms(rewrite_started),
            }),
        );
        self.accept(template, result.code, started)
    }

    /// Validate a caller-supplied modern body for `template`.
    pub fn migrate_with_body(&self, template: &Template, candidate: &str) -> Result<Template, MigrateError> {
        self.accept(template, candidate.to_string(), Instant::now())
    }

    fn accept(&self, template: &Template, candidate: String, started: Instant) -> Result<Template, MigrateError> {
        let verdict = validate(self.engine, &candidate, ValidateOptions::default());
        if !verdict.is_valid {
            self.error(
                "validate",
                json!({
                    "templateId": template.id,
                    "unresolved": verdict.patterns.len(),
                    "rules": verdict.patterns.iter().map(|d| d.rule_id.as_str()).collect::<Vec<_>>(),
                    "confidence": verdict.confidence,
                    "elapsedMs": ms(started),
                }),
            );
            return Err(MigrateError::ValidationFailed {
                diagnostics: verdict.patterns,
            });
        }
        let mut fields = Map::new();
        fields.insert("syntaxVersion".into(), Json::from(SYNTAX_VERSION));
        fields.insert("migratedAt".into(), Json::from(chrono::Utc::now().to_rfc3339()));
        self.info(
            "validate",
            json!({
                "templateId": template.id,
                "changed": candidate != template.code,
                "confidence": verdict.confidence,
                "elapsedMs": ms(started),
            }),
        );
        Ok(template.with_code(candidate, fields))
    }

    fn info(&self, stage: &str, context: Json) {
        let _ = self.logger.info(stage, &context);
    }

    fn error(&self, stage: &str, context: Json) {
        let _ = self.logger.error(stage, &context);
    }
}

fn ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{replace_group, Catalog, Rule};
    use crate::context::ContextFilter;
    use crate::error::LogError;
    use crate::logging::NullLogger;
    use crate::models::Severity;
    use crate::scanner::RegexDetector;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        records: Mutex<Vec<(String, String, Json)>>,
    }

    impl Logger for Recording {
        fn info(&self, message: &str, context: &Json) -> Result<(), LogError> {
            self.records
                .lock()
                .unwrap()
                .push(("info".into(), message.into(), context.clone()));
            Ok(())
        }
        fn error(&self, message: &str, context: &Json) -> Result<(), LogError> {
            self.records
                .lock()
                .unwrap()
                .push(("error".into(), message.into(), context.clone()));
            Ok(())
        }
    }

    struct Failing;

    impl Logger for Failing {
        fn info(&self, _: &str, _: &Json) -> Result<(), LogError> {
            Err(LogError("disk full".into()))
        }
        fn error(&self, _: &str, _: &Json) -> Result<(), LogError> {
            Err(LogError("disk full".into()))
        }
    }

    fn legacy_template() -> Template {
        let mut t = Template::new(
            "vault-setup",
            "transaction {\n  prepare(signer: &Account) {\n    signer.save(<-v, to: /storage/v)\n  }\n}",
        );
        t.metadata.insert("name".into(), json!("Vault setup"));
        t
    }

    #[test]
    fn test_migrate_rewrites_and_refreshes_metadata() {
        let engine = Engine::default();
        let logger = Recording::default();
        let original = legacy_template();
        let out = Migrator::new(&engine, &logger).migrate_template(&original).unwrap();
        assert!(out.code.contains("signer.storage.save(<-v, to: /storage/v)"));
        assert_eq!(out.id, original.id);
        assert_eq!(out.metadata["name"], json!("Vault setup"));
        assert_eq!(out.metadata["syntaxVersion"], json!(SYNTAX_VERSION));
        assert!(out.metadata["migratedAt"].is_string());
        assert!(original.code.contains("signer.save("));
        assert!(!original.metadata.contains_key("migratedAt"));

        let records = logger.records.lock().unwrap();
        let stages: Vec<_> = records.iter().map(|r| r.1.as_str()).collect();
        assert_eq!(stages, vec!["scan", "rewrite", "validate"]);
        assert_eq!(records[1].2["fixed"], json!(1));
        assert!(records[0].2["elapsedMs"].is_number());
    }

    #[test]
    fn test_candidate_with_legacy_call_fails_validation() {
        let engine = Engine::default();
        let original = legacy_template();
        let snapshot = original.clone();
        let candidate = "transaction {\n  prepare(signer: &Account) {\n    signer.load<@V>(from: /storage/v)\n  }\n}";
        let err = Migrator::new(&engine, &NullLogger)
            .migrate_with_body(&original, candidate)
            .unwrap_err();
        match err {
            MigrateError::ValidationFailed { diagnostics } => {
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(diagnostics[0].rule_id, "legacy-storage-call");
                assert_eq!(diagnostics[0].line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_hand_authored_body_is_accepted() {
        let engine = Engine::default();
        let original = legacy_template();
        let body = "transaction {\n  prepare(signer: auth(Storage) &Account) {\n    signer.storage.save(<-v, to: /storage/v)\n  }\n}";
        let out = Migrator::new(&engine, &NullLogger)
            .migrate_with_body(&original, body)
            .unwrap();
        assert_eq!(out.code, body);
    }

    #[test]
    fn test_unfixable_findings_reject_migration() {
        let engine = Engine::default();
        let t = Template::new("t", "pub fun f(a: AuthAccount) {}");
        let err = Migrator::new(&engine, &NullLogger).migrate_template(&t).unwrap_err();
        let MigrateError::ValidationFailed { diagnostics } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(diagnostics[0].rule_id, "legacy-account-type");
    }

    #[test]
    fn test_conflict_is_reported_to_caller() {
        let a = Rule::new("a", r"(?P<w>old)", Severity::Error, "a")
            .unwrap()
            .with_fix(replace_group("w", "new"));
        let b = Rule::new("b", r"o(?P<w>ld)", Severity::Error, "b")
            .unwrap()
            .with_fix(replace_group("w", "ne"));
        let engine = Engine::new(RegexDetector::new(Catalog::new(vec![a, b])), ContextFilter::default());
        let logger = Recording::default();
        let t = Template::new("t", "old");
        let err = Migrator::new(&engine, &logger).migrate_template(&t).unwrap_err();
        assert!(matches!(err, MigrateError::PatternConflict(_)));
        assert_eq!(logger.records.lock().unwrap().last().unwrap().0, "error");
    }

    #[test]
    fn test_logger_failures_never_abort() {
        let engine = Engine::default();
        let out = Migrator::new(&engine, &Failing).migrate_template(&legacy_template());
        assert!(out.is_ok());
    }

    #[test]
    fn test_clean_template_skips_rewrite() {
        let engine = Engine::default();
        let logger = Recording::default();
        let t = Template::new("clean", "access(all) fun f() {}");
        let out = Migrator::new(&engine, &logger).migrate_template(&t).unwrap();
        assert_eq!(out.code, t.code);
        let records = logger.records.lock().unwrap();
        assert_eq!(records.len(), 2);
    }
}
