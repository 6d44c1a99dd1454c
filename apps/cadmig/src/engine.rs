//! Detector plus context filter, shared by rewrite, validation, and migration.

use crate::catalog::{Catalog, BUILTIN};
use crate::context::ContextFilter;
use crate::fragments::Fragment;
use crate::models::Diagnostic;
use crate::report::to_diagnostics;
use crate::scanner::{scan_fragments, Detector, RegexDetector};

pub struct Engine {
    detector: Box<dyn Detector>,
    filter: ContextFilter,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RegexDetector::builtin(), ContextFilter::default())
    }
}

impl Engine {
    pub fn new(detector: impl Detector + 'static, filter: ContextFilter) -> Self {
        Self {
            detector: Box::new(detector),
            filter,
        }
    }

    /// Built-in catalog minus `disabled` rules, default markers plus `markers`.
    pub fn configured(disabled: &[String], markers: &[String]) -> Self {
        Self::new(
            RegexDetector::new(BUILTIN.without(disabled)),
            ContextFilter::with_markers(markers),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        self.detector.catalog()
    }

    pub fn filter(&self) -> &ContextFilter {
        &self.filter
    }

    /// Diagnostics for a whole source text.
    pub fn diagnose(&self, text: &str) -> Vec<Diagnostic> {
        self.diagnose_fragments(text, &[Fragment::whole(text)])
    }

    /// Diagnostics for `fragments` of `doc`, positioned in `doc`.
    pub fn diagnose_fragments(&self, doc: &str, fragments: &[Fragment<'_>]) -> Vec<Diagnostic> {
        let matches = scan_fragments(fragments, self.detector.as_ref(), &self.filter);
        to_diagnostics(matches, doc, self.catalog())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::template_literals;

    #[test]
    fn test_diagnose_host_document_positions() {
        let doc = "// host\nconst tx = `\ntransaction {\n  prepare(acct: AuthAccount) {\n    acct.save(<-r, to: /storage/r)\n  }\n}`;\n";
        let engine = Engine::default();
        let diags = engine.diagnose_fragments(doc, &template_literals(doc));
        let ids: Vec<_> = diags.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["legacy-account-type", "legacy-storage-call"]);
        assert_eq!((diags[1].line, diags[1].column), (5, 5));
    }

    #[test]
    fn test_configured_disables_rules_and_adds_markers() {
        let engine = Engine::configured(&["legacy-account-type".into()], &["OLD STYLE".into()]);
        assert!(engine.diagnose("fun f(a: AuthAccount) {}").is_empty());
        assert!(engine.diagnose("// OLD STYLE\npub var x: Int").is_empty());
        assert_eq!(engine.diagnose("pub var x: Int").len(), 1);
    }
}
