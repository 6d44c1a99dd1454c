//! Context filter: regions that must never be reported or rewritten.
//!
//! Two levels:
//! - A fragment containing a marker phrase (e.g. `NEVER use`) is skipped
//!   entirely. This is coarse on purpose and is a known false-negative
//!   zone: documentation-like fragments are never half-fixed.
//! - A match starting inside a `//` or `/* */` comment is dropped. Block
//!   comments nest. Double-quoted string contents are not comments.

use std::ops::Range;

/// Case-sensitive phrases that flag a fragment as an intentional example.
pub const DEFAULT_MARKERS: &[&str] = &["NEVER use", "Legacy syntax example", "DEPRECATED SYNTAX"];

#[derive(Debug, Clone)]
pub struct ContextFilter {
    markers: Vec<String>,
}

impl Default for ContextFilter {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ContextFilter {
    /// Default markers plus `extra`.
    pub fn with_markers(extra: &[String]) -> Self {
        let mut filter = Self::default();
        for m in extra {
            if !m.is_empty() && !filter.markers.contains(m) {
                filter.markers.push(m.clone());
            }
        }
        filter
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// True when `text` contains any marker phrase.
    pub fn is_marked(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }

    /// True when a match at `offset` (relative to `text`) must be suppressed.
    pub fn is_excluded(&self, text: &str, offset: usize) -> bool {
        self.is_marked(text) || in_ranges(&self.comment_ranges(text), offset)
    }

    /// Byte ranges of all comments in `text`, ascending.
    pub fn comment_ranges(&self, text: &str) -> Vec<Range<usize>> {
        comment_ranges(text)
    }
}

/// Binary search over sorted, disjoint ranges.
pub fn in_ranges(ranges: &[Range<usize>], offset: usize) -> bool {
    let idx = ranges.partition_point(|r| r.end <= offset);
    ranges.get(idx).is_some_and(|r| r.start <= offset)
}

fn comment_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' && bytes[i] != b'\n' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let start = i;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                out.push(start..i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                let mut depth = 0usize;
                while i < bytes.len() {
                    if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                        depth += 1;
                        i += 2;
                    } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        depth -= 1;
                        i += 2;
                        if depth == 0 {
                            break;
                        }
                    } else {
                        i += 1;
                    }
                }
                out.push(start..i.min(bytes.len()));
            }
            _ => i += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_case_sensitive() {
        let f = ContextFilter::default();
        assert!(f.is_marked("// NEVER use pub fun"));
        assert!(!f.is_marked("// never use pub fun"));
    }

    #[test]
    fn test_extra_markers_extend_defaults() {
        let f = ContextFilter::with_markers(&["OLD:".to_string(), "NEVER use".to_string()]);
        assert_eq!(f.markers().len(), DEFAULT_MARKERS.len() + 1);
        assert!(f.is_marked("OLD: pub var x"));
    }

    #[test]
    fn test_line_and_block_comments() {
        let text = "a // b\nc /* d /* e */ f */ g";
        let ranges = comment_ranges(text);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&text[ranges[0].clone()], "// b");
        assert_eq!(&text[ranges[1].clone()], "/* d /* e */ f */");
        let f = ContextFilter::default();
        assert!(f.is_excluded(text, text.find('f').unwrap()));
        assert!(!f.is_excluded(text, text.find('g').unwrap()));
    }

    #[test]
    fn test_comment_markers_inside_strings_are_ignored() {
        let text = r#"let url = "http://x" pub var y: Int"#;
        assert!(comment_ranges(text).is_empty());
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let text = "x /* pub var y";
        let f = ContextFilter::default();
        assert!(f.is_excluded(text, text.find("pub").unwrap()));
    }
}
