//! Registration and resolution errors.

use std::fmt;

use featureflow_patterns::{PatternError, StepKeyword};
use thiserror::Error;

use super::convert::ConversionCause;
use crate::model::Location;

/// A step definition could not be registered.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Definitions are registered under `Given`, `When` or `Then` only.
    #[error("step definitions cannot be registered under the conjunction `{keyword}`")]
    ConjunctionKeyword {
        /// The rejected keyword.
        keyword: StepKeyword,
    },
    /// A format-style pattern is malformed.
    #[error("invalid step pattern {pattern:?}: {source}")]
    Format {
        /// Pattern as written.
        pattern: String,
        /// Underlying pattern error.
        #[source]
        source: PatternError,
    },
    /// A regular expression pattern does not compile.
    #[error("invalid step regex {pattern:?}: {source}")]
    Regex {
        /// Expression as written.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

fn write_location(f: &mut fmt::Formatter<'_>, location: Option<Location>) -> fmt::Result {
    match location {
        Some(location) => write!(f, " at line {}, column {}", location.line, location.column),
        None => Ok(()),
    }
}

/// No definition matches a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinitionNotFoundError {
    /// Keyword the step was resolved under.
    pub keyword: StepKeyword,
    /// Step text.
    pub text: String,
    /// Location of the step in its feature file.
    pub location: Option<Location>,
}

impl fmt::Display for StepDefinitionNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no step definition matches `{} {}`", self.keyword, self.text)?;
        write_location(f, self.location)
    }
}

impl std::error::Error for StepDefinitionNotFoundError {}

/// More than one definition matches a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousStepError {
    /// Keyword the step was resolved under.
    pub keyword: StepKeyword,
    /// Step text.
    pub text: String,
    /// Location of the step in its feature file.
    pub location: Option<Location>,
    /// Descriptions of every matching definition, in registration order.
    pub matches: Vec<String>,
}

impl fmt::Display for AmbiguousStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step `{} {}`", self.keyword, self.text)?;
        write_location(f, self.location)?;
        write!(
            f,
            " matches {} definitions: {}",
            self.matches.len(),
            self.matches.join("; ")
        )
    }
}

impl std::error::Error for AmbiguousStepError {}

/// A converter rejected a captured value.
#[derive(Debug, Error)]
#[error("cannot convert argument `{argument}` value {value:?} for {definition}: {cause}")]
pub struct StepArgumentConversionError {
    /// Argument name.
    pub argument: String,
    /// Raw captured text.
    pub value: String,
    /// Description of the matched definition.
    pub definition: String,
    /// Why the converter failed.
    #[source]
    pub cause: ConversionCause,
}

/// Resolution of a step to a single definition failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No definition matches.
    #[error(transparent)]
    NotFound(#[from] StepDefinitionNotFoundError),
    /// Several definitions match.
    #[error(transparent)]
    Ambiguous(#[from] AmbiguousStepError),
    /// The match succeeded but an argument failed to convert.
    #[error(transparent)]
    Conversion(#[from] StepArgumentConversionError),
}
