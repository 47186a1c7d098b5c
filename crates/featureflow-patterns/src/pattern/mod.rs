//! Step-pattern lexing and compilation helpers.

mod compiler;
mod lexer;
mod placeholder;

use crate::capture::extract_captured_values;
use crate::errors::PatternError;
use regex::Regex;

pub use compiler::build_regex_from_pattern;

/// A field declared by a format-style pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternField {
    /// Field name. Positional fields are numbered `"0"`, `"1"`, ... in order.
    pub name: String,
    /// Type hint following the `:` separator, if any.
    pub hint: Option<String>,
    /// Whether the field was written as `{}` or `{:hint}`.
    pub positional: bool,
}

/// A field value captured from matching step text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedField {
    /// Name of the field that captured the value.
    pub name: String,
    /// Type hint of the field, if any.
    pub hint: Option<String>,
    /// Raw captured text.
    pub value: String,
}

/// A format-style pattern compiled to an anchored regular expression.
///
/// # Examples
/// ```
/// use featureflow_patterns::CompiledPattern;
///
/// let pattern = CompiledPattern::compile("I have {count:u32} {item}")
///     .expect("example ensures fallible call succeeds");
/// let captures = pattern
///     .captures("I have 3 apples")
///     .expect("example ensures the text matches");
/// assert_eq!(captures.len(), 2);
/// assert_eq!(captures[0].value, "3");
/// assert_eq!(captures[1].name, "item");
/// ```
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    fields: Vec<PatternField>,
}

impl CompiledPattern {
    /// Compile `pattern`.
    ///
    /// # Errors
    /// Returns [`PatternError`] when field parsing fails or the generated
    /// regex cannot be compiled.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let (source, fields) = compiler::compile_pattern(pattern)?;
        let regex = Regex::new(&source)?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
            fields,
        })
    }

    /// The pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled, anchored regular expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Fields in capture order.
    #[must_use]
    pub fn fields(&self) -> &[PatternField] {
        &self.fields
    }

    /// Match `text` in full and return the captured fields, or `None` when
    /// the text does not match.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<CapturedField>> {
        let values = extract_captured_values(&self.regex, text)?;
        Some(
            self.fields
                .iter()
                .zip(values)
                .map(|(field, value)| CapturedField {
                    name: field.name.clone(),
                    hint: field.hint.clone(),
                    value,
                })
                .collect(),
        )
    }
}
