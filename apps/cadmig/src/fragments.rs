//! Fragment extraction from host documents.
//!
//! Contract code embedded in JavaScript/TypeScript lives in backtick
//! template literals. Each literal body becomes one or more fragments,
//! cut at `${ ... }` interpolations, with its byte offset in the host.
//! Pieces of one literal share a `literal` id. Regex literals in the host
//! are not recognized.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A contiguous slice of a document scanned on its own.
pub struct Fragment<'a> {
    pub text: &'a str,
    pub base: usize,
    /// Enclosing literal; pieces cut at interpolations share it.
    pub literal: usize,
}

impl<'a> Fragment<'a> {
    /// A standalone fragment at `base`.
    pub fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            base,
            literal: base,
        }
    }

    /// The whole document as a single fragment.
    pub fn whole(text: &'a str) -> Self {
        Self::new(text, 0)
    }
}

/// Template-literal fragments of `doc`, in document order.
pub fn template_literals(doc: &str) -> Vec<Fragment<'_>> {
    let bytes = doc.as_bytes();
    let mut out = Vec::new();
    // (brace depth, literal id) of each open `${`, innermost last
    let mut interpolations: Vec<(usize, usize)> = Vec::new();
    // (body start, literal id) while inside a literal body
    let mut literal: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < bytes.len() {
        if let Some((start, id)) = literal {
            match bytes[i] {
                b'\\' => i += 2,
                b'`' => {
                    push(&mut out, doc, start, i, id);
                    literal = None;
                    i += 1;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    push(&mut out, doc, start, i, id);
                    literal = None;
                    interpolations.push((0, id));
                    i += 2;
                }
                _ => i += 1,
            }
            continue;
        }
        match bytes[i] {
            b'`' => {
                literal = Some((i + 1, i));
                i += 1;
            }
            q @ (b'\'' | b'"') => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != q && bytes[j] != b'\n' {
                    j += if bytes[j] == b'\\' { 2 } else { 1 };
                }
                // an unclosed quote (JSX text like `Don't`) is not a string
                i = if j < bytes.len() && bytes[j] == q { j + 1 } else { i + 1 };
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b'{' => {
                if let Some((depth, _)) = interpolations.last_mut() {
                    *depth += 1;
                }
                i += 1;
            }
            b'}' => {
                match interpolations.last_mut() {
                    Some((0, id)) => {
                        literal = Some((i + 1, *id));
                        interpolations.pop();
                    }
                    Some((depth, _)) => *depth -= 1,
                    None => {}
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    if let Some((start, id)) = literal {
        push(&mut out, doc, start, bytes.len(), id);
    }
    out
}

fn push<'a>(out: &mut Vec<Fragment<'a>>, doc: &'a str, start: usize, end: usize, literal: usize) {
    if start < end {
        out.push(Fragment {
            text: &doc[start..end],
            base: start,
            literal,
        });
    }
}
