//! Pattern lexer converting pattern strings into semantic tokens.

use crate::errors::PatternError;

use super::placeholder::{PlaceholderSpec, parse_placeholder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    /// A field; `name` is `None` for positional `{}` / `{:hint}` fields.
    Placeholder {
        start: usize,
        name: Option<String>,
        hint: Option<String>,
    },
    OpenBrace {
        index: usize,
    },
    CloseBrace {
        index: usize,
    },
}

fn starts_field(next: u8) -> bool {
    next.is_ascii_alphabetic() || next == b'_' || next == b':' || next == b'}'
}

pub(crate) fn lex_pattern(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let bytes = pattern.as_bytes();
    let mut tokens = Vec::new();
    let mut literal = Vec::<u8>::new();
    let mut pos = 0;

    let flush_literal = |literal: &mut Vec<u8>, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            let text = String::from_utf8_lossy(literal).into_owned();
            literal.clear();
            tokens.push(Token::Literal(text));
        }
    };

    while let Some(&b) = bytes.get(pos) {
        match b {
            b'\\' => {
                if let Some(&next) = bytes.get(pos + 1) {
                    literal.push(next);
                    pos += 2;
                } else {
                    literal.push(b'\\');
                    pos += 1;
                }
            }
            b'{' => {
                if bytes.get(pos + 1) == Some(&b'{') {
                    literal.push(b'{');
                    pos += 2;
                    continue;
                }
                if bytes.get(pos + 1).is_some_and(|&next| starts_field(next)) {
                    flush_literal(&mut literal, &mut tokens);
                    let (
                        next_pos,
                        PlaceholderSpec {
                            start, name, hint, ..
                        },
                    ) = parse_placeholder(bytes, pos)?;
                    let name = (!name.is_empty()).then_some(name);
                    tokens.push(Token::Placeholder { start, name, hint });
                    pos = next_pos;
                    continue;
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::OpenBrace { index: pos });
                pos += 1;
            }
            b'}' => {
                if bytes.get(pos + 1) == Some(&b'}') {
                    literal.push(b'}');
                    pos += 2;
                    continue;
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::CloseBrace { index: pos });
                pos += 1;
            }
            _ => {
                literal.push(b);
                pos += 1;
            }
        }
    }

    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests exercise lexing fallibility")]
mod tests {
    use super::*;

    #[test]
    fn tokenises_literals_and_named_fields() {
        let tokens = lex_pattern("Given {value:u32}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("Given ".into()),
                Token::Placeholder {
                    start: 6,
                    name: Some("value".into()),
                    hint: Some("u32".into()),
                },
            ]
        );
    }

    #[test]
    fn tokenises_positional_fields() {
        let tokens = lex_pattern("{} and {:d}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Placeholder {
                    start: 0,
                    name: None,
                    hint: None,
                },
                Token::Literal(" and ".into()),
                Token::Placeholder {
                    start: 7,
                    name: None,
                    hint: Some("d".into()),
                },
            ]
        );
    }

    #[test]
    fn recognises_doubled_braces_as_literals() {
        let tokens = lex_pattern("{{outer}} {inner}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("{outer} ".into()),
                Token::Placeholder {
                    start: 10,
                    name: Some("inner".into()),
                    hint: None,
                },
            ]
        );
    }

    #[test]
    fn keeps_multibyte_literals_intact() {
        let tokens = lex_pattern("café {x}").unwrap();
        assert_eq!(tokens.first(), Some(&Token::Literal("café ".into())));
    }

    #[test]
    fn records_stray_braces() {
        let tokens = lex_pattern("{ literal }").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::OpenBrace { index: 0 },
                Token::Literal(" literal ".into()),
                Token::CloseBrace { index: 10 },
            ]
        );
    }
}
