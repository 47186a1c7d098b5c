//! Error types for step execution failures.

use std::error::Error;

use thiserror::Error;

use crate::model::DataTableShapeError;
use crate::registry::{
    AmbiguousStepError, ResolveError, StepArgumentConversionError, StepDefinitionNotFoundError,
};

/// Failure reported by a step handler.
#[derive(Debug, Error)]
pub enum StepError {
    /// A check inside the handler did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),
    /// The handler panicked.
    #[error("step panicked: {0}")]
    Panic(String),
    /// The handler asked for an argument that was not supplied.
    #[error("missing step argument `{name}`")]
    MissingArgument {
        /// Argument name.
        name: String,
    },
    /// An argument has a different type than the handler expected.
    #[error("step argument `{name}` is a {actual}, not a {expected}")]
    ArgumentType {
        /// Argument name.
        name: String,
        /// Type the handler asked for.
        expected: &'static str,
        /// Type actually supplied.
        actual: &'static str,
    },
    /// Any other failure.
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl StepError {
    /// A failure carrying only a message.
    ///
    /// # Examples
    /// ```
    /// use featureflow::execution::StepError;
    ///
    /// assert_eq!(StepError::msg("out of stock").to_string(), "out of stock");
    /// ```
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Other(message.into().into())
    }

    /// An assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }
}

/// Why a step did not complete.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// No definition matches the step.
    #[error(transparent)]
    NotFound(#[from] StepDefinitionNotFoundError),
    /// Several definitions match the step.
    #[error(transparent)]
    Ambiguous(#[from] AmbiguousStepError),
    /// An argument failed to convert.
    #[error(transparent)]
    Conversion(#[from] StepArgumentConversionError),
    /// A handler parameter is neither reserved nor provided as a fixture.
    #[error("no fixture named `{name}` for {definition}")]
    MissingFixture {
        /// Parameter name.
        name: String,
        /// Description of the matched definition.
        definition: String,
    },
    /// A handler parameter needs a data table or doc string the step lacks.
    #[error("step has no {block} for parameter `{name}`")]
    MissingStepBlock {
        /// Parameter name.
        name: String,
        /// `data table` or `doc string`.
        block: &'static str,
    },
    /// The step's data table cannot be read as columns.
    #[error(transparent)]
    TableShape(#[from] DataTableShapeError),
    /// The handler returned an error or panicked.
    #[error(transparent)]
    Handler(StepError),
}

impl ExecutionError {
    /// Whether the failure came from the handler itself rather than from
    /// preparing the call.
    #[must_use]
    pub fn is_handler_failure(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}

impl From<ResolveError> for ExecutionError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(err) => Self::NotFound(err),
            ResolveError::Ambiguous(err) => Self::Ambiguous(err),
            ResolveError::Conversion(err) => Self::Conversion(err),
        }
    }
}
