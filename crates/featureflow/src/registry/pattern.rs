//! Step patterns and the matching capability they share.

use std::fmt;

use featureflow_patterns::CompiledPattern;
use regex::Regex;

use super::convert::{Converter, hint_converter};
use super::error::RegistrationError;

/// One argument extracted from step text.
#[derive(Clone)]
pub struct Binding {
    /// Argument name. Positional format fields are named `"0"`, `"1"`, ...
    pub name: String,
    /// Captured text.
    pub raw: String,
    /// Converter selected by the pattern, if any.
    pub converter: Option<Converter>,
}

impl Binding {
    /// A binding without a converter.
    #[must_use]
    pub fn text(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            converter: None,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("raw", &self.raw)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// Arguments extracted by a successful match, in pattern order.
pub type Bindings = Vec<Binding>;

/// Something that can decide whether step text matches.
pub trait StepMatcher: fmt::Debug + Send + Sync {
    /// Match `text` in full, returning the extracted arguments.
    fn attempt_match(&self, text: &str) -> Option<Bindings>;

    /// Human readable form used in diagnostics.
    fn describe(&self) -> String;
}

/// How a step definition recognises step text.
#[derive(Debug)]
pub enum StepPattern {
    /// Plain string equality.
    Exact(String),
    /// A regular expression that must match the whole text. Named groups
    /// become named arguments.
    ///
    /// A named group that takes no part in the match, such as an optional
    /// `(?P<note> quickly)?` left out, binds nothing. The argument is then
    /// absent unless a fixture of the same name supplies it. A group that
    /// matched empty text binds `""`.
    Regex {
        /// Expression as written.
        source: String,
        /// Anchored compiled form.
        regex: Regex,
    },
    /// A format-style pattern such as `I have {count:u32} {item}`.
    Format(CompiledPattern),
    /// Any other matcher.
    Custom(Box<dyn StepMatcher>),
}

impl StepPattern {
    /// An exact-text pattern.
    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// A full-match regular expression pattern.
    ///
    /// # Errors
    /// Returns [`RegistrationError::Regex`] when `source` does not compile.
    pub fn regex(source: &str) -> Result<Self, RegistrationError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|err| {
            RegistrationError::Regex {
                pattern: source.to_owned(),
                source: err,
            }
        })?;
        Ok(Self::Regex {
            source: source.to_owned(),
            regex,
        })
    }

    /// A format-style pattern.
    ///
    /// # Errors
    /// Returns [`RegistrationError::Format`] when the pattern is malformed.
    ///
    /// # Examples
    /// ```
    /// use featureflow::registry::{StepMatcher, StepPattern};
    ///
    /// let pattern = StepPattern::format("I have {count:u32} apples")
    ///     .expect("example pattern is valid");
    /// let bindings = pattern.attempt_match("I have 3 apples").expect("text matches");
    /// assert_eq!(bindings[0].name, "count");
    /// assert_eq!(bindings[0].raw, "3");
    /// ```
    pub fn format(source: &str) -> Result<Self, RegistrationError> {
        CompiledPattern::compile(source)
            .map(Self::Format)
            .map_err(|err| RegistrationError::Format {
                pattern: source.to_owned(),
                source: err,
            })
    }

    /// A pattern backed by a custom matcher.
    #[must_use]
    pub fn custom(matcher: impl StepMatcher + 'static) -> Self {
        Self::Custom(Box::new(matcher))
    }
}

impl StepMatcher for StepPattern {
    fn attempt_match(&self, text: &str) -> Option<Bindings> {
        match self {
            Self::Exact(expected) => (expected == text).then(Vec::new),
            Self::Regex { regex, .. } => {
                let caps = regex.captures(text)?;
                Some(
                    regex
                        .capture_names()
                        .flatten()
                        .filter_map(|name| {
                            caps.name(name)
                                .map(|value| Binding::text(name, value.as_str()))
                        })
                        .collect(),
                )
            }
            Self::Format(pattern) => {
                let captured = pattern.captures(text)?;
                Some(
                    captured
                        .into_iter()
                        .map(|field| Binding {
                            converter: field.hint.as_deref().and_then(hint_converter),
                            name: field.name,
                            raw: field.value,
                        })
                        .collect(),
                )
            }
            Self::Custom(matcher) => matcher.attempt_match(text),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Exact(text) => text.clone(),
            Self::Regex { source, .. } => format!("/{source}/"),
            Self::Format(pattern) => pattern.as_str().to_owned(),
            Self::Custom(matcher) => matcher.describe(),
        }
    }
}
