//! Diagnostic reporter: matches to rendered, positioned diagnostics.

use crate::catalog::Catalog;
use crate::models::Diagnostic;
use crate::scanner::{sort_matches, Match};

/// Line start offsets of a text, for offset to line/column conversion.
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    /// 1-based line and 1-based column (in characters) of `offset`.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset);
        let line_start = self.starts[line.saturating_sub(1)];
        let column = self
            .text
            .get(line_start..offset.min(self.text.len()))
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);
        (line, column + 1)
    }
}

/// Convert `matches` found in `text` into diagnostics in source order.
pub fn to_diagnostics(mut matches: Vec<Match>, text: &str, catalog: &Catalog) -> Vec<Diagnostic> {
    sort_matches(&mut matches);
    let index = LineIndex::new(text);
    matches
        .iter()
        .filter_map(|m| {
            let rule = catalog.rules().get(m.rule_index)?;
            let (line, column) = index.position(m.start);
            Some(Diagnostic {
                rule_id: rule.id.to_string(),
                message: rule.render_message(m),
                severity: rule.severity,
                start: m.start,
                end: m.end,
                line,
                column,
                fix: rule.fix(m),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BUILTIN;
    use crate::models::Severity;
    use crate::scanner::{scan, RegexDetector};

    #[test]
    fn test_line_index_positions() {
        let idx = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(idx.position(0), (1, 1));
        assert_eq!(idx.position(1), (1, 2));
        assert_eq!(idx.position(3), (2, 1));
        assert_eq!(idx.position(6), (3, 1));
        assert_eq!(idx.position(8), (4, 2));
    }

    #[test]
    fn test_columns_count_characters_not_bytes() {
        let text = "let é = 1; pub var x: Int";
        let idx = LineIndex::new(text);
        let off = text.find("pub").unwrap();
        assert_eq!(idx.position(off), (1, 12));
    }

    #[test]
    fn test_diagnostics_carry_position_message_and_fix() {
        let text = "import X\n\naccess(all) contract C {\n    pub var v: Int\n}";
        let diags = to_diagnostics(scan(text, &RegexDetector::builtin()), text, &BUILTIN);
        assert_eq!(diags.len(), 1);
        let d = &diags[0];
        assert_eq!(d.rule_id, "legacy-pub-access");
        assert_eq!((d.line, d.column), (4, 5));
        assert_eq!(d.severity, Severity::Error);
        assert!(d.message.contains("`pub var`"));
        let fix = d.fix.as_ref().unwrap();
        assert_eq!(&text[fix.start..fix.end], "pub");
        assert_eq!(fix.replacement, "access(all)");
    }

    #[test]
    fn test_detect_only_diagnostic_has_no_fix() {
        let text = "prepare(signer: AuthAccount) {}";
        let diags = to_diagnostics(scan(text, &RegexDetector::builtin()), text, &BUILTIN);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert!(!diags[0].is_fixable());
        assert!(diags[0].message.starts_with("`AuthAccount`"));
    }
}
