//! Rule catalog for legacy contract syntax.
//!
//! A rule pairs a detection regex with a message template and, when
//! fixable, a fix that rewrites one named capture group and nothing else.
//! The surrounding context a pattern needs (declaration keyword, opening
//! parenthesis, block opener) is matched but never replaced.
//!
//! Invariant: no replacement text produced by any rule is matched by any
//! rule of the catalog, so a fixed text re-scans clean.

use crate::models::{Fix, Severity};
use crate::scanner::Match;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Maps a match (absolute offsets, named captures) to a replacement.
pub type FixFn = Arc<dyn Fn(&Match) -> Option<Fix> + Send + Sync>;

/// Type arguments between angle brackets, one level, bounded.
const TYPE_ARGS: &str = r"(?:<[^<>()\n]{1,160}>)?";

#[derive(Clone)]
/// One detection pattern with its message and optional fix.
pub struct Rule {
    pub id: &'static str,
    pub pattern: Regex,
    pub severity: Severity,
    /// Message template; `${name}` interpolates a named capture.
    pub message: &'static str,
    fix: Option<FixFn>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .field("severity", &self.severity)
            .field("fixable", &self.fixable())
            .finish()
    }
}

impl Rule {
    pub fn new(
        id: &'static str,
        pattern: &str,
        severity: Severity,
        message: &'static str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            id,
            pattern: Regex::new(pattern)?,
            severity,
            message,
            fix: None,
        })
    }

    pub fn with_fix(mut self, fix: FixFn) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn fixable(&self) -> bool {
        self.fix.is_some()
    }

    pub fn fix(&self, m: &Match) -> Option<Fix> {
        self.fix.as_ref().and_then(|f| f(m))
    }

    /// Render the message template against the captures of `m`.
    pub fn render_message(&self, m: &Match) -> String {
        let mut out = String::with_capacity(self.message.len());
        let mut rest = self.message;
        while let Some(pos) = rest.find("${") {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    if let Some(cap) = m.capture(name) {
                        out.push_str(&cap.text);
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[pos..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Fix that replaces the span of capture `group` with `replacement`.
pub fn replace_group(group: &'static str, replacement: &'static str) -> FixFn {
    Arc::new(move |m: &Match| {
        let cap = m.capture(group)?;
        Some(Fix {
            start: cap.start,
            end: cap.end,
            replacement: replacement.to_string(),
        })
    })
}

/// Fix that inserts `infix` after the leading `.` of capture `group`,
/// e.g. `.save` becomes `.storage.save`.
fn namespace_call(group: &'static str, infix: &'static str, callee: &'static str) -> FixFn {
    Arc::new(move |m: &Match| {
        let cap = m.capture(group)?;
        let verb = if callee.is_empty() {
            cap.text.trim_start_matches('.')
        } else {
            callee
        };
        Some(Fix {
            start: cap.start,
            end: cap.end,
            replacement: format!(".{}.{}", infix, verb),
        })
    })
}

/// Rewrite the separators of a conformance list: `A, B` becomes `A & B`.
/// Identifiers and the whitespace around them stay in place.
fn intersect_list(m: &Match) -> Option<Fix> {
    let list = m.capture("list")?;
    let mut out = String::with_capacity(list.text.len() + 8);
    let mut chars = list.text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != ',' {
            out.push(c);
            continue;
        }
        if !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push('&');
        if !chars.peek().is_some_and(|n| n.is_whitespace()) {
            out.push(' ');
        }
    }
    Some(Fix {
        start: list.start,
        end: list.end,
        replacement: out,
    })
}

#[derive(Clone, Debug, Default)]
/// Ordered rule list. Declaration order breaks ties between equal offsets.
pub struct Catalog {
    rules: Vec<Rule>,
}

impl Catalog {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Copy of the catalog without the rules named in `ids`.
    pub fn without(&self, ids: &[String]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|r| !ids.iter().any(|id| id == r.id))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Built-in catalog, compiled on first use.
pub static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog::new(builtin_rules()));

/// Ordered built-in rules.
pub fn list_rules() -> &'static [Rule] {
    BUILTIN.rules()
}

fn builtin_rules() -> Vec<Rule> {
    let storage_call = format!(
        r"\b(?P<recv>signer|acct|account|[a-z]\w*Account)(?P<call>\.(?P<verb>save|load|copy|borrow))\s*{}\s*\(",
        TYPE_ARGS
    );
    let link_call = format!(r"(?P<call>\.link)\s*{}\s*\(", TYPE_ARGS);
    let borrow_call = format!(r"(?P<call>\.getCapability)\s*{}\s*\(", TYPE_ARGS);
    let defs: Vec<(&'static str, String, Severity, &'static str, Option<FixFn>)> = vec![
        (
            "legacy-pub-access",
            r"\b(?P<kw>pub)\s+(?P<decl>var|let|fun|resource|struct|contract|interface|event|enum)\b"
                .into(),
            Severity::Error,
            "`pub ${decl}` uses legacy visibility; declare it as `access(all) ${decl}`",
            Some(replace_group("kw", "access(all)")),
        ),
        (
            "legacy-pub-set-access",
            r"\b(?P<kw>pub\(set\))".into(),
            Severity::Error,
            "`pub(set)` is legacy visibility; rewritten to `access(all)`, which drops the setter-only restriction (review manually)",
            Some(replace_group("kw", "access(all)")),
        ),
        (
            "legacy-storage-call",
            storage_call,
            Severity::Error,
            "direct `${verb}` on `${recv}` is legacy storage API; call `${recv}.storage.${verb}`",
            Some(namespace_call("call", "storage", "")),
        ),
        (
            "legacy-capability-link",
            link_call,
            Severity::Error,
            "`link` is removed; issue capabilities with `capabilities.storage.issue`",
            Some(namespace_call("call", "capabilities.storage", "issue")),
        ),
        (
            "legacy-capability-borrow",
            borrow_call,
            Severity::Error,
            "`getCapability` is removed; borrow through `capabilities.borrow`",
            Some(namespace_call("call", "capabilities", "borrow")),
        ),
        (
            "legacy-conformance-list",
            r"\b(?:resource|struct|contract)(?:\s+interface)?\s+[A-Za-z_]\w*\s*:\s*(?P<list>[A-Za-z_][\w.]*(?:\s*,\s*[A-Za-z_][\w.]*){1,15})\s*\{"
                .into(),
            Severity::Error,
            "comma-separated conformance list `${list}` is legacy; join interfaces with `&`",
            Some(Arc::new(intersect_list)),
        ),
        (
            "legacy-priv-access",
            r"\b(?P<kw>priv)\s+(?:var|let|fun)\b".into(),
            Severity::Error,
            "`priv` is legacy visibility; use `access(self)`",
            Some(replace_group("kw", "access(self)")),
        ),
        (
            "legacy-pub-account-access",
            r"\b(?P<kw>pub\(account\))".into(),
            Severity::Error,
            "`pub(account)` is legacy visibility; use `access(account)`",
            Some(replace_group("kw", "access(account)")),
        ),
        (
            "legacy-account-type",
            r"\b(?P<ty>AuthAccount|PublicAccount)\b".into(),
            Severity::Warning,
            "`${ty}` no longer exists; use an entitled `&Account` reference (manual migration)",
            None,
        ),
    ];
    defs
        .into_iter()
        .map(|(id, pattern, severity, message, fix)| {
            let rule = Rule::new(id, &pattern, severity, message)
                .unwrap_or_else(|e| panic!("built-in rule '{}' has an invalid pattern: {}", id, e));
            match fix {
                Some(f) => rule.with_fix(f),
                None => rule,
            }
        })
        .collect()
}
