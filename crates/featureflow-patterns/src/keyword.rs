//! The keyword a step definition is registered under.
//!
//! A parsed step is reduced to one of the primary keywords before lookup.
//! Conjunctions borrow the keyword of the step before them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Keyword of a step definition or of a step being resolved.
///
/// `And` and `But` never identify a definition on their own; see
/// [`resolve`](Self::resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Context: the state before the action.
    Given,
    /// Action: the event under test.
    When,
    /// Outcome: the expected result.
    Then,
    /// Continues the previous primary keyword.
    And,
    /// Continues the previous primary keyword with a contrast.
    But,
}

impl StepKeyword {
    /// English spelling of the keyword.
    ///
    /// ```
    /// use featureflow_patterns::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::But.as_str(), "But");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Whether the keyword is `And` or `But`.
    #[must_use]
    pub const fn is_conjunction(self) -> bool {
        matches!(self, Self::And | Self::But)
    }

    /// The primary keyword this step runs under.
    ///
    /// A primary keyword is returned as is and recorded in `previous`. A
    /// conjunction returns the recorded keyword, or `Given` at the start of a
    /// block, and leaves `previous` alone.
    ///
    /// ```
    /// use featureflow_patterns::StepKeyword;
    ///
    /// let mut previous = None;
    /// assert_eq!(StepKeyword::And.resolve(&mut previous), StepKeyword::Given);
    /// assert_eq!(StepKeyword::Then.resolve(&mut previous), StepKeyword::Then);
    /// assert_eq!(StepKeyword::But.resolve(&mut previous), StepKeyword::Then);
    /// ```
    #[must_use]
    pub fn resolve(self, previous: &mut Option<Self>) -> Self {
        if self.is_conjunction() {
            return previous.unwrap_or(Self::Given);
        }
        *previous = Some(self);
        self
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text that names no English step keyword.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid step keyword: {0}")]
pub struct StepKeywordParseError(pub String);

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    /// Case-insensitive; surrounding whitespace is ignored and the `*`
    /// bullet reads as `And`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let word = value.trim();
        match word.to_ascii_lowercase().as_str() {
            "given" => Ok(Self::Given),
            "when" => Ok(Self::When),
            "then" => Ok(Self::Then),
            "and" | "*" => Ok(Self::And),
            "but" => Ok(Self::But),
            _ => Err(StepKeywordParseError(word.to_owned())),
        }
    }
}
