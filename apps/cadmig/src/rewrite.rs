//! Rewriter: applies fix spans to the original text.
//!
//! Fix spans are stated in original-text coordinates. They are applied
//! left to right; overlapping spans are never resolved here, the caller
//! gets a `PatternConflict` and the text is left alone. After a pass the
//! output is re-scanned; a fixable leftover marks the pass non-idempotent.

use crate::engine::Engine;
use crate::error::PatternConflict;
use crate::models::{Diagnostic, RewriteResult};

/// Upper bound on rewrite passes over one text.
pub const MAX_PASSES: usize = 3;

/// Apply the fixes of `diagnostics` to `text`.
///
/// Returns the new text and the diagnostics whose fix was applied, in
/// ascending fix order. Diagnostics without a fix are ignored.
pub fn apply_fixes(
    text: &str,
    diagnostics: &[Diagnostic],
) -> Result<(String, Vec<Diagnostic>), PatternConflict> {
    let mut fixable: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.fix.is_some()).collect();
    fixable.sort_by_key(|d| d.fix.as_ref().map(|f| (f.start, f.end)));
    for pair in fixable.windows(2) {
        if let (Some(a), Some(b)) = (pair[0].fix.as_ref(), pair[1].fix.as_ref()) {
            if a.overlaps(b) || (a.start == b.start && a.end == b.end) {
                return Err(PatternConflict::between(pair[0], pair[1]));
            }
        }
    }

    let mut out = String::with_capacity(text.len() + fixable.len() * 16);
    let mut delta: isize = 0;
    let mut cursor = 0;
    for d in &fixable {
        let Some(fix) = d.fix.as_ref() else { continue };
        out.push_str(&text[cursor..fix.start]);
        debug_assert_eq!(out.len() as isize, fix.start as isize + delta);
        out.push_str(&fix.replacement);
        delta += fix.replacement.len() as isize - (fix.end - fix.start) as isize;
        cursor = fix.end;
    }
    out.push_str(&text[cursor..]);
    debug_assert_eq!(out.len() as isize, text.len() as isize + delta);
    Ok((out, fixable.into_iter().cloned().collect()))
}

/// One pass over `text` using the given diagnostics, then a re-scan.
pub fn rewrite_with(
    engine: &Engine,
    text: &str,
    diagnostics: &[Diagnostic],
) -> Result<RewriteResult, PatternConflict> {
    let (code, fixed) = apply_fixes(text, diagnostics)?;
    let remaining = engine.diagnose(&code);
    let idempotent = !remaining.iter().any(Diagnostic::is_fixable);
    Ok(RewriteResult {
        code,
        fixed,
        remaining,
        idempotent,
    })
}

/// Scan and rewrite `text` in a single pass.
pub fn rewrite(engine: &Engine, text: &str) -> Result<RewriteResult, PatternConflict> {
    let diagnostics = engine.diagnose(text);
    rewrite_with(engine, text, &diagnostics)
}

/// Rewrite until a pass is idempotent or `max_passes` is reached.
///
/// Returns the last pass's result with `fixed` accumulated over all
/// passes, and the number of passes run. Offsets of diagnostics fixed in
/// later passes refer to that pass's input.
pub fn rewrite_until_stable(
    engine: &Engine,
    text: &str,
    max_passes: usize,
) -> Result<(RewriteResult, usize), PatternConflict> {
    let mut result = rewrite(engine, text)?;
    let mut passes = 1;
    while !result.idempotent && passes < max_passes.max(1) {
        let next = rewrite_with(engine, &result.code, &result.remaining)?;
        let mut fixed = std::mem::take(&mut result.fixed);
        fixed.extend(next.fixed);
        result = RewriteResult { fixed, ..next };
        passes += 1;
    }
    if !result.idempotent {
        tracing::warn!(
            passes,
            remaining = result.remaining.len(),
            "rewrite is not idempotent; a rule still matches its own output"
        );
    }
    Ok((result, passes))
}
