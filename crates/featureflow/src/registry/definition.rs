//! Step definitions.

use std::fmt;
use std::sync::Arc;

use featureflow_patterns::StepKeyword;

use super::convert::{ArgValue, ConversionCause, Converter};
use super::error::RegistrationError;
use super::pattern::{StepMatcher, StepPattern};
use crate::execution::{StepArguments, StepError};

/// The function run for a matched step.
pub type StepHandler = Arc<dyn Fn(&StepArguments) -> Result<(), StepError> + Send + Sync>;

/// A registered step: keyword, pattern, handler and the extra parameters the
/// handler needs.
pub struct StepDefinition {
    keyword: StepKeyword,
    pattern: StepPattern,
    handler: StepHandler,
    parameters: Vec<String>,
    converters: Vec<(String, Converter)>,
    file: &'static str,
    line: u32,
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern)
            .field("parameters", &self.parameters)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

impl StepDefinition {
    /// Create a definition located at the caller.
    ///
    /// # Errors
    /// Returns [`RegistrationError::ConjunctionKeyword`] for `And` and `But`.
    #[track_caller]
    pub fn new<F>(
        keyword: StepKeyword,
        pattern: StepPattern,
        handler: F,
    ) -> Result<Self, RegistrationError>
    where
        F: Fn(&StepArguments) -> Result<(), StepError> + Send + Sync + 'static,
    {
        if keyword.is_conjunction() {
            return Err(RegistrationError::ConjunctionKeyword { keyword });
        }
        let caller = std::panic::Location::caller();
        Ok(Self {
            keyword,
            pattern,
            handler: Arc::new(handler),
            parameters: Vec::new(),
            converters: Vec::new(),
            file: caller.file(),
            line: caller.line(),
        })
    }

    /// Declare handler parameters that the pattern does not bind. They are
    /// filled from the step's data table or doc string, or from fixtures.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.extend(names.into_iter().map(Into::into));
        self
    }

    /// Convert argument `name` with `converter`, overriding any type hint.
    #[must_use]
    pub fn with_converter<F>(mut self, name: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&str) -> Result<ArgValue, ConversionCause> + Send + Sync + 'static,
    {
        self.converters.push((name.into(), Arc::new(converter)));
        self
    }

    /// Record where the definition was written.
    #[must_use]
    pub fn at(mut self, file: &'static str, line: u32) -> Self {
        self.file = file;
        self.line = line;
        self
    }

    /// Keyword the definition is registered under.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// The pattern matched against step text.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// Parameters filled outside the pattern.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Explicit converter for argument `name`.
    #[must_use]
    pub fn converter(&self, name: &str) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|(argument, _)| argument == name)
            .map(|(_, converter)| converter)
    }

    /// Source file of the definition.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Source line of the definition.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// `Keyword "pattern" (file:line)`, used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} {:?} ({}:{})",
            self.keyword,
            self.pattern.describe(),
            self.file,
            self.line
        )
    }

    /// Run the handler.
    ///
    /// # Errors
    /// Returns whatever the handler returns.
    pub fn invoke(&self, arguments: &StepArguments) -> Result<(), StepError> {
        (self.handler)(arguments)
    }
}
