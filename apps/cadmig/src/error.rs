//! Error types for rewriting, migration, config, and input decoding.

use crate::models::Diagnostic;
use std::path::PathBuf;

/// Two fixes claim overlapping text. Nothing is rewritten.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "conflicting fixes: '{first_rule}' ({first_start}..{first_end}) overlaps '{second_rule}' ({second_start}..{second_end})"
)]
pub struct PatternConflict {
    pub first_rule: String,
    pub first_start: usize,
    pub first_end: usize,
    pub second_rule: String,
    pub second_start: usize,
    pub second_end: usize,
}

impl PatternConflict {
    pub(crate) fn between(first: &Diagnostic, second: &Diagnostic) -> Self {
        let span = |d: &Diagnostic| d.fix.as_ref().map(|f| (f.start, f.end)).unwrap_or((d.start, d.end));
        let (first_start, first_end) = span(first);
        let (second_start, second_end) = span(second);
        Self {
            first_rule: first.rule_id.clone(),
            first_start,
            first_end,
            second_rule: second.rule_id.clone(),
            second_start,
            second_end,
        }
    }
}

/// Malformed input handed to the core.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("{path}: source is not valid UTF-8 (byte {offset})")]
    Encoding { path: PathBuf, offset: usize },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: not a template record: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A config file that exists but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: failed to parse config: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Failure of a single template migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error(transparent)]
    PatternConflict(#[from] PatternConflict),

    #[error("validation failed: {} unresolved diagnostic(s)", diagnostics.len())]
    ValidationFailed { diagnostics: Vec<Diagnostic> },
}

/// Raised by a `Logger` backend. Call sites always discard it.
#[derive(Debug, thiserror::Error)]
#[error("logging failed: {0}")]
pub struct LogError(pub String);
