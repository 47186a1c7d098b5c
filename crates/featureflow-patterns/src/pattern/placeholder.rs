//! Field parsing utilities used by the lexer.

use crate::errors::{PatternError, placeholder_error};

const INVALID: &str = "invalid placeholder in step pattern";
const UNCLOSED: &str = "missing closing '}' for placeholder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaceholderSpec {
    /// Field name; empty for positional fields.
    pub name: String,
    pub hint: Option<String>,
    pub start: usize,
    pub end: usize,
}

fn find_closing_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes.get(start..)?.iter().enumerate() {
        match b {
            b'{' => depth = depth.saturating_add(1),
            b'}' if depth == 0 => return Some(start + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_hint(
    bytes: &[u8],
    start: usize,
    index: &mut usize,
    name: &str,
) -> Result<String, PatternError> {
    let hint_start = *index;
    while bytes.get(*index).is_some_and(|&b| b != b'}') {
        *index += 1;
    }
    let raw = bytes
        .get(hint_start..*index)
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .ok_or_else(|| placeholder_error(INVALID, start, Some(name.to_owned())))?;
    if raw.is_empty()
        || raw.chars().any(|c| c.is_ascii_whitespace())
        || raw.contains('{')
        || raw.contains('}')
    {
        return Err(placeholder_error(INVALID, start, Some(name.to_owned())));
    }
    Ok(raw.to_owned())
}

pub(crate) fn parse_placeholder(
    bytes: &[u8],
    start: usize,
) -> Result<(usize, PlaceholderSpec), PatternError> {
    let mut index = start + 1;
    let mut name = String::new();
    while let Some(&b) = bytes.get(index) {
        if b.is_ascii_alphanumeric() || b == b'_' {
            name.push(char::from(b));
            index += 1;
        } else {
            break;
        }
    }

    if bytes.get(index).is_some_and(u8::is_ascii_whitespace) {
        let mut ws_end = index;
        while bytes.get(ws_end).is_some_and(u8::is_ascii_whitespace) {
            ws_end += 1;
        }
        if matches!(bytes.get(ws_end), Some(b':' | b'}')) {
            return Err(placeholder_error(INVALID, start, Some(name)));
        }
        index = ws_end;
    }

    let mut hint = None;
    if matches!(bytes.get(index), Some(b':')) {
        index += 1;
        hint = Some(parse_hint(bytes, start, &mut index, &name)?);
    } else {
        index = find_closing_brace(bytes, index)
            .ok_or_else(|| placeholder_error(UNCLOSED, start, Some(name.clone())))?;
    }

    if !matches!(bytes.get(index), Some(b'}')) {
        return Err(placeholder_error(UNCLOSED, start, Some(name)));
    }
    index += 1;

    Ok((
        index,
        PlaceholderSpec {
            name,
            hint,
            start,
            end: index,
        },
    ))
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests exercise placeholder parser fallibility"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("{value}", "value", None)]
    #[case("{value:u32}", "value", Some("u32"))]
    #[case("{outer {inner}}", "outer", None)]
    #[case("{}", "", None)]
    #[case("{:w}", "", Some("w"))]
    fn parses_fields(#[case] pattern: &str, #[case] name: &str, #[case] hint: Option<&str>) {
        let (next, spec) = parse_placeholder(pattern.as_bytes(), 0).unwrap();
        assert_eq!(next, pattern.len());
        assert_eq!(spec.end, pattern.len());
        assert_eq!(spec.name, name);
        assert_eq!(spec.hint.as_deref(), hint);
    }

    #[test]
    fn errors_on_missing_closing_brace() {
        let err = parse_placeholder(b"{value", 0).unwrap_err();
        assert!(err.to_string().contains("missing closing"));
    }

    #[rstest]
    #[case("{value :u32}")]
    #[case("{value:}")]
    #[case("{:}")]
    fn rejects_malformed_hints(#[case] pattern: &str) {
        let err = parse_placeholder(pattern.as_bytes(), 0).unwrap_err();
        assert!(err.to_string().contains(INVALID));
    }
}
