//! Shared data models for scan, rewrite, and migration outputs.

pub mod template;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Diagnostic severity. Only `Error` lowers the confidence score.
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Replacement of `start..end` (byte offsets into the scanned text) by `replacement`.
pub struct Fix {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Fix {
    pub fn overlaps(&self, other: &Fix) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A rendered finding. `line` and `column` are both 1-based; the column
/// counts characters since the last line break.
pub struct Diagnostic {
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Caller-provided validation flags.
pub struct ValidateOptions {
    /// Report legacy patterns but never reject because of them.
    pub allow_legacy_syntax: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Validation verdict for one text.
pub struct ScanResult {
    pub is_valid: bool,
    pub has_legacy_patterns: bool,
    pub patterns: Vec<Diagnostic>,
    pub confidence: f64,
    pub validation_time_ms: f64,
}

impl ScanResult {
    pub fn error_count(&self) -> usize {
        self.patterns
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
/// Output of a rewrite pass. `remaining` holds everything a re-scan of
/// `code` still detects; `idempotent` is false if any of it is fixable.
pub struct RewriteResult {
    pub code: String,
    pub fixed: Vec<Diagnostic>,
    pub remaining: Vec<Diagnostic>,
    pub idempotent: bool,
}

#[derive(Serialize, Default, Debug, Clone, PartialEq, Eq)]
/// Aggregated summary used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub files: usize,
    pub invalid: usize,
}
