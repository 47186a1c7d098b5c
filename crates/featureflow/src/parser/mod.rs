//! Feature-file parsing.
//!
//! [`FeatureParser`] reads a file, decodes it with the configured
//! [`SourceEncoding`], hands the text to a [`GrammarEngine`] and converts the
//! resulting document tree into the typed [`model`](crate::model). Grammar
//! failures are classified into [`GherkinParseError`] values that point at the
//! offending line.

mod classify;
mod engine;
mod gherkin_engine;
mod scan;
mod structure;

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

pub use classify::ParseErrorKind;
pub use engine::{EngineFailure, GrammarEngine};
pub use gherkin_engine::GherkinEngine;

use crate::config::{ParserConfig, SourceEncoding};
use crate::model::GherkinDocument;

/// A grammar error located in a feature file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}Error: {message}\nLine number: {line}\nLine: {line_content}\nFile: {filename}")]
pub struct GherkinParseError {
    /// Category of the failure.
    pub kind: ParseErrorKind,
    /// Human readable explanation.
    pub message: String,
    /// 1-based line of the first failure, 0 when unknown.
    pub line: usize,
    /// Text of the failing line, empty when `line` is out of range.
    pub line_content: String,
    /// File the text came from.
    pub filename: String,
    /// The engine diagnostic.
    #[source]
    pub source: EngineFailure,
}

/// Errors raised while reading a feature file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file bytes are not valid in the configured encoding.
    #[error("failed to decode {path} as {encoding}: {source}")]
    Decode {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Encoding that was attempted.
        encoding: SourceEncoding,
        /// Underlying decoding error.
        #[source]
        source: std::str::Utf8Error,
    },
    /// The text is not a valid feature file.
    #[error(transparent)]
    Grammar(Box<GherkinParseError>),
    /// The engine produced a tree that does not fit the model.
    #[error("malformed document tree for {filename}: {source}")]
    Document {
        /// File the text came from.
        filename: String,
        /// Underlying conversion error.
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    /// The grammar error, when this is one.
    #[must_use]
    pub fn as_grammar(&self) -> Option<&GherkinParseError> {
        match self {
            Self::Grammar(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GherkinParseError> for ParseError {
    fn from(err: GherkinParseError) -> Self {
        Self::Grammar(Box::new(err))
    }
}

/// Parse the feature file at `path` with the default engine and language.
///
/// # Errors
/// See [`FeatureParser::parse_path`].
pub fn parse_feature_file(
    path: impl AsRef<Utf8Path>,
    encoding: SourceEncoding,
) -> Result<GherkinDocument, ParseError> {
    FeatureParser::new(ParserConfig::default().with_encoding(encoding)).parse_path(path)
}

/// A configured feature-file parser.
#[derive(Clone)]
pub struct FeatureParser {
    config: ParserConfig,
    engine: Arc<dyn GrammarEngine>,
}

impl fmt::Debug for FeatureParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureParser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for FeatureParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

/// Literal text of 1-based `line`, without its line terminator.
fn source_line(source: &str, line: usize) -> String {
    line.checked_sub(1)
        .and_then(|index| source.lines().nth(index))
        .map(|text| text.strip_suffix('\r').unwrap_or(text).to_owned())
        .unwrap_or_default()
}

impl FeatureParser {
    /// Create a parser backed by [`GherkinEngine`].
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self::with_engine(config, Arc::new(GherkinEngine))
    }

    /// Create a parser backed by `engine`.
    #[must_use]
    pub fn with_engine(config: ParserConfig, engine: Arc<dyn GrammarEngine>) -> Self {
        Self { config, engine }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Read, decode and parse the file at `path`.
    ///
    /// # Errors
    /// Returns [`ParseError::Io`] when the file cannot be read,
    /// [`ParseError::Decode`] when its bytes do not fit the configured
    /// encoding, and any error of [`FeatureParser::parse_str`].
    pub fn parse_path(&self, path: impl AsRef<Utf8Path>) -> Result<GherkinDocument, ParseError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_owned(),
            source,
        })?;
        let text = self
            .config
            .encoding
            .decode(&bytes)
            .map_err(|source| ParseError::Decode {
                path: path.to_owned(),
                encoding: self.config.encoding,
                source,
            })?;
        self.parse_str(&text, path.as_str())
    }

    /// Parse feature text, reporting errors against `filename`.
    ///
    /// # Errors
    /// Returns [`ParseError::Grammar`] when the engine rejects the text and
    /// [`ParseError::Document`] when its tree does not fit the model.
    pub fn parse_str(&self, source: &str, filename: &str) -> Result<GherkinDocument, ParseError> {
        let tree = self
            .engine
            .parse(source, &self.config.language)
            .map_err(|failure| {
                let (kind, message) = classify::classify(&failure.message);
                let line = failure.first_line();
                GherkinParseError {
                    kind,
                    message,
                    line,
                    line_content: source_line(source, line),
                    filename: filename.to_owned(),
                    source: failure,
                }
            })?;
        let document =
            GherkinDocument::from_json(tree).map_err(|source| ParseError::Document {
                filename: filename.to_owned(),
                source,
            })?;
        log::debug!(
            "parsed {filename}: feature {:?} with {} children",
            document.feature.name,
            document.feature.children.len()
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests;
