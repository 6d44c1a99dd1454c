//! Validator: gating verdict and confidence score for a text.

use crate::engine::Engine;
use crate::fragments::Fragment;
use crate::models::{Diagnostic, ScanResult, Severity, ValidateOptions};
use std::time::Instant;

/// Confidence lost per error-severity diagnostic.
pub const ERROR_PENALTY: f64 = 0.15;

/// `1 - ERROR_PENALTY * errors`, clamped to `[0, 1]`.
pub fn confidence(errors: usize) -> f64 {
    (1.0 - ERROR_PENALTY * errors as f64).clamp(0.0, 1.0)
}

/// Validate a whole source text.
pub fn validate(engine: &Engine, text: &str, options: ValidateOptions) -> ScanResult {
    let started = Instant::now();
    verdict(engine.diagnose(text), options, started)
}

/// Validate the fragments of a host document.
pub fn validate_fragments(
    engine: &Engine,
    doc: &str,
    fragments: &[Fragment<'_>],
    options: ValidateOptions,
) -> ScanResult {
    let started = Instant::now();
    verdict(engine.diagnose_fragments(doc, fragments), options, started)
}

fn verdict(patterns: Vec<Diagnostic>, options: ValidateOptions, started: Instant) -> ScanResult {
    let has_legacy_patterns = !patterns.is_empty();
    let errors = patterns
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    ScanResult {
        is_valid: options.allow_legacy_syntax || !has_legacy_patterns,
        has_legacy_patterns,
        confidence: confidence(errors),
        patterns,
        validation_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    }
}
