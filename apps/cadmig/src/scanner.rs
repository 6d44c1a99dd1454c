//! Text scanning: rule matches with absolute offsets.
//!
//! Detection sits behind the `Detector` trait so a grammar-aware detector
//! can replace the regex one without touching reporting, rewriting, or
//! validation. Every call builds fresh match iterators; no match state is
//! kept on the rules between calls.

use crate::catalog::{Catalog, BUILTIN};
use crate::context::{in_ranges, ContextFilter};
use crate::fragments::Fragment;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named capture with absolute offsets.
pub struct Capture {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One rule occurrence. Offsets are absolute in the scanned document.
pub struct Match {
    pub rule_index: usize,
    pub rule_id: String,
    pub start: usize,
    pub end: usize,
    pub captures: BTreeMap<String, Capture>,
}

impl Match {
    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.get(name)
    }
}

/// Finds rule occurrences in one fragment of text.
pub trait Detector: Send + Sync {
    /// Rules this detector reports against; `Match::rule_index` indexes it.
    fn catalog(&self) -> &Catalog;

    /// All matches in `text`, offsets shifted by `base`.
    fn detect(&self, text: &str, base: usize) -> Vec<Match>;
}

#[derive(Debug, Clone)]
/// Lexical detector: each rule's regex over raw text.
pub struct RegexDetector {
    catalog: Catalog,
}

impl RegexDetector {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN.clone())
    }
}

impl Detector for RegexDetector {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn detect(&self, text: &str, base: usize) -> Vec<Match> {
        let mut out = Vec::new();
        for (rule_index, rule) in self.catalog.rules().iter().enumerate() {
            let names: Vec<Option<&str>> = rule.pattern.capture_names().collect();
            // captures_iter resumes right after each matched span
            for caps in rule.pattern.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let mut captures = BTreeMap::new();
                for (i, name) in names.iter().enumerate() {
                    if let (Some(name), Some(g)) = (name, caps.get(i)) {
                        captures.insert(
                            name.to_string(),
                            Capture {
                                start: base + g.start(),
                                end: base + g.end(),
                                text: g.as_str().to_string(),
                            },
                        );
                    }
                }
                out.push(Match {
                    rule_index,
                    rule_id: rule.id.to_string(),
                    start: base + whole.start(),
                    end: base + whole.end(),
                    captures,
                });
            }
        }
        out
    }
}

/// Source order: ascending start, ties by rule declaration order.
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| a.start.cmp(&b.start).then(a.rule_index.cmp(&b.rule_index)));
}

/// Unfiltered scan of a whole text.
pub fn scan(text: &str, detector: &dyn Detector) -> Vec<Match> {
    let mut matches = detector.detect(text, 0);
    sort_matches(&mut matches);
    matches
}

/// Scan each fragment at its own base offset, drop excluded matches, and
/// merge into one sequence sorted by absolute offset.
///
/// A marker in any piece of a literal suppresses every piece of it.
pub fn scan_fragments(
    fragments: &[Fragment<'_>],
    detector: &dyn Detector,
    filter: &ContextFilter,
) -> Vec<Match> {
    let marked: BTreeSet<usize> = fragments
        .iter()
        .filter(|f| filter.is_marked(f.text))
        .map(|f| f.literal)
        .collect();
    let mut merged = Vec::new();
    for frag in fragments {
        if marked.contains(&frag.literal) {
            tracing::debug!(base = frag.base, "literal carries a legacy-example marker; skipped");
            continue;
        }
        let comments = filter.comment_ranges(frag.text);
        merged.extend(
            detector
                .detect(frag.text, frag.base)
                .into_iter()
                .filter(|m| !in_ranges(&comments, m.start - frag.base)),
        );
    }
    sort_matches(&mut merged);
    merged
}
