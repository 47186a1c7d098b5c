//! Convert lexed tokens into anchored regular-expression sources.

use crate::errors::{PatternError, placeholder_error};
use crate::hint::get_type_pattern;

use super::PatternField;
use super::lexer::{Token, lex_pattern};

/// Lex `pat` and produce the anchored regex source plus the declared fields
/// in capture-group order.
pub(crate) fn compile_pattern(pat: &str) -> Result<(String, Vec<PatternField>), PatternError> {
    let tokens = lex_pattern(pat)?;
    let mut regex = String::with_capacity(pat.len().saturating_mul(2) + 2);
    let mut fields: Vec<PatternField> = Vec::new();
    let mut positional = 0usize;
    regex.push('^');
    let mut stray_depth = 0usize;

    for token in tokens {
        match token {
            Token::Literal(text) => regex.push_str(&regex::escape(&text)),
            Token::Placeholder { start, name, hint } => {
                let field = match name {
                    Some(name) => {
                        if fields.iter().any(|f| !f.positional && f.name == name) {
                            return Err(placeholder_error(
                                "duplicate placeholder name in step pattern",
                                start,
                                Some(name),
                            ));
                        }
                        PatternField {
                            name,
                            hint,
                            positional: false,
                        }
                    }
                    None => {
                        let name = positional.to_string();
                        positional += 1;
                        PatternField {
                            name,
                            hint,
                            positional: true,
                        }
                    }
                };
                regex.push('(');
                regex.push_str(get_type_pattern(field.hint.as_deref()));
                regex.push(')');
                fields.push(field);
            }
            Token::OpenBrace { .. } => {
                stray_depth = stray_depth.saturating_add(1);
                regex.push_str(&regex::escape("{"));
            }
            Token::CloseBrace { index } => {
                if stray_depth == 0 {
                    return Err(placeholder_error(
                        "unmatched closing brace '}' in step pattern",
                        index,
                        None,
                    ));
                }
                stray_depth -= 1;
                regex.push_str(&regex::escape("}"));
            }
        }
    }

    if stray_depth != 0 {
        return Err(placeholder_error(
            "unbalanced braces in step pattern",
            pat.len(),
            None,
        ));
    }

    regex.push('$');
    Ok((regex, fields))
}

/// Build an anchored regular expression source from a format-style pattern.
///
/// # Errors
/// Returns [`PatternError`] when the pattern contains malformed fields,
/// duplicate field names or unbalanced braces.
///
/// # Examples
/// ```
/// # use featureflow_patterns::build_regex_from_pattern;
/// let regex = build_regex_from_pattern("Given {item}")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(regex, r"^Given (.+?)$");
/// ```
pub fn build_regex_from_pattern(pat: &str) -> Result<String, PatternError> {
    compile_pattern(pat).map(|(regex, _)| regex)
}
