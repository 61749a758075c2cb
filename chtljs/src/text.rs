//! String helpers shared by the lowering code.

use crate::backend::optimize::{walk, Region};

/// Escape a string for inclusion in a JavaScript string literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_string`]. Unknown escapes keep the escaped character.
pub fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Strip the surrounding quotes of a string literal and unescape its body.
/// Text that is not quoted is returned unchanged.
pub fn unquote(literal: &str) -> String {
    let bytes = literal.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return unescape_string(&literal[1..literal.len() - 1]);
        }
    }
    literal.to_string()
}

/// Render `s` as a single-quoted JavaScript string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Indent every non-empty line of `text` by `levels` steps of four spaces.
/// Lines that begin inside a string or template literal are part of the
/// literal's value and are left exactly as they are.
pub fn indent(text: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    let mut in_literal = vec![false];
    walk(text, |c, region| {
        if c == '\n' {
            in_literal.push(matches!(region, Region::Quoted(_)));
        }
    });
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n')
        .zip(in_literal)
        .map(|(line, literal)| {
            if literal {
                return line.to_string();
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether `s` can be written as a bare JavaScript identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render an object key, quoting it only when needed.
pub fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}
