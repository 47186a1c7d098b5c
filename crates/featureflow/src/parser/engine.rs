//! The grammar engine seam.

use thiserror::Error;

use crate::model::Location;

/// A failure reported by a grammar engine.
///
/// `message` holds one diagnostic per line, each ideally shaped as
/// `(line:col): expected: <tokens>, got '<source line>'`. `locations` lists
/// the failing positions with the first failure first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineFailure {
    /// Raw diagnostic text.
    pub message: String,
    /// Failing positions, first one first.
    pub locations: Vec<Location>,
}

impl EngineFailure {
    /// Create a failure with a single location.
    #[must_use]
    pub fn at(location: Location, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![location],
        }
    }

    /// Line of the first failure, or 0 when the engine reported none.
    #[must_use]
    pub fn first_line(&self) -> usize {
        self.locations.first().map_or(0, |location| location.line)
    }
}

/// Turns feature-file text into a Gherkin JSON document tree.
///
/// The returned value must have the `{ "feature": ..., "comments": [...] }`
/// shape accepted by [`GherkinDocument::from_json`](crate::model::GherkinDocument::from_json).
pub trait GrammarEngine: Send + Sync {
    /// Parse `source` using `language` as the default dialect.
    ///
    /// # Errors
    /// Returns [`EngineFailure`] when the text is not a valid feature file.
    fn parse(&self, source: &str, language: &str) -> Result<serde_json::Value, EngineFailure>;
}
