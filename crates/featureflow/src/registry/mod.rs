//! Step registration and resolution.
//!
//! Definitions are collected in a mutable [`StepRegistryBuilder`] and frozen
//! into an immutable [`StepRegistry`] by [`StepRegistryBuilder::build`]. The
//! registry is `Send + Sync` and resolves step text to exactly one
//! definition, reporting missing and ambiguous matches as errors.

mod convert;
mod definition;
mod error;
mod pattern;
mod submitted;

use featureflow_patterns::StepKeyword;

pub use convert::{ArgValue, ConversionCause, Converter, hint_converter};
pub use definition::{StepDefinition, StepHandler};
pub use error::{
    AmbiguousStepError, RegistrationError, ResolveError, StepArgumentConversionError,
    StepDefinitionNotFoundError,
};
pub use pattern::{Binding, Bindings, StepMatcher, StepPattern};
pub use submitted::{StepFn, SubmittedStep};

use crate::execution::{StepArguments, StepError};
use crate::model::{Location, Step};

/// Collects step definitions before they are frozen.
#[derive(Debug, Default)]
pub struct StepRegistryBuilder {
    definitions: Vec<StepDefinition>,
}

impl StepRegistryBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for steps matching `pattern` under `keyword`.
    ///
    /// # Errors
    /// Returns [`RegistrationError::ConjunctionKeyword`] when `keyword` is
    /// `And` or `But`.
    ///
    /// # Examples
    /// ```
    /// use featureflow::registry::{StepPattern, StepRegistryBuilder};
    /// use featureflow_patterns::StepKeyword;
    ///
    /// let mut builder = StepRegistryBuilder::new();
    /// builder
    ///     .register(StepKeyword::Given, StepPattern::exact("a user"), |_| Ok(()))
    ///     .expect("Given is a primary keyword");
    /// let registry = builder.build();
    /// assert!(registry.resolve(StepKeyword::Given, "a user").is_ok());
    /// ```
    #[track_caller]
    pub fn register<F>(
        &mut self,
        keyword: StepKeyword,
        pattern: StepPattern,
        handler: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&StepArguments) -> Result<(), StepError> + Send + Sync + 'static,
    {
        let definition = StepDefinition::new(keyword, pattern, handler)?;
        Ok(self.add(definition))
    }

    /// Add a fully configured definition.
    pub fn add(&mut self, definition: StepDefinition) -> &mut Self {
        log::debug!("registered step definition {}", definition.describe());
        self.definitions.push(definition);
        self
    }

    /// Add every step submitted with [`step!`](crate::step).
    ///
    /// Submissions are added in file and line order so resolution does not
    /// depend on link order.
    ///
    /// # Errors
    /// Returns the first [`RegistrationError`] raised by a submission.
    pub fn collect_submitted(&mut self) -> Result<&mut Self, RegistrationError> {
        let mut steps: Vec<&SubmittedStep> = submitted::submitted().collect();
        steps.sort_by_key(|step| (step.file, step.line));
        for step in steps {
            let pattern = StepPattern::format(step.pattern)?;
            let definition = StepDefinition::new(step.keyword, pattern, step.handler)?
                .with_parameters(step.parameters.iter().copied())
                .at(step.file, step.line);
            self.add(definition);
        }
        Ok(self)
    }

    /// Number of definitions collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definition has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Freeze the collected definitions.
    #[must_use]
    pub fn build(self) -> StepRegistry {
        StepRegistry {
            definitions: self.definitions,
        }
    }
}

/// A step resolved to its definition with converted arguments.
#[derive(Debug)]
pub struct ResolvedStep<'r> {
    /// The matching definition.
    pub definition: &'r StepDefinition,
    /// Arguments bound by the pattern, in pattern order.
    pub arguments: Vec<(String, ArgValue)>,
}

/// Immutable set of step definitions.
#[derive(Debug)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Registered definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[StepDefinition] {
        &self.definitions
    }

    /// Resolve `text` written under `keyword`.
    ///
    /// # Errors
    /// Returns [`ResolveError::NotFound`] when nothing matches,
    /// [`ResolveError::Ambiguous`] when several definitions match and
    /// [`ResolveError::Conversion`] when an argument cannot be converted.
    pub fn resolve(&self, keyword: StepKeyword, text: &str) -> Result<ResolvedStep<'_>, ResolveError> {
        self.resolve_at(keyword, text, None)
    }

    /// Resolve a parsed step under `keyword`, attaching its location to
    /// errors.
    ///
    /// # Errors
    /// See [`StepRegistry::resolve`].
    pub fn resolve_step(
        &self,
        step: &Step,
        keyword: StepKeyword,
    ) -> Result<ResolvedStep<'_>, ResolveError> {
        self.resolve_at(keyword, &step.text, Some(step.location))
    }

    fn resolve_at(
        &self,
        keyword: StepKeyword,
        text: &str,
        location: Option<Location>,
    ) -> Result<ResolvedStep<'_>, ResolveError> {
        let mut matches: Vec<(&StepDefinition, Bindings)> = self
            .definitions
            .iter()
            .filter(|definition| definition.keyword() == keyword)
            .filter_map(|definition| {
                definition
                    .pattern()
                    .attempt_match(text)
                    .map(|bindings| (definition, bindings))
            })
            .collect();

        if matches.len() > 1 {
            let descriptions: Vec<String> = matches
                .iter()
                .map(|(definition, _)| definition.describe())
                .collect();
            log::warn!("ambiguous step `{keyword} {text}`: {}", descriptions.join("; "));
            return Err(AmbiguousStepError {
                keyword,
                text: text.to_owned(),
                location,
                matches: descriptions,
            }
            .into());
        }
        let Some((definition, bindings)) = matches.pop() else {
            return Err(StepDefinitionNotFoundError {
                keyword,
                text: text.to_owned(),
                location,
            }
            .into());
        };

        let arguments = bindings
            .into_iter()
            .map(|binding| convert_binding(definition, binding))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("resolved `{keyword} {text}` to {}", definition.describe());
        Ok(ResolvedStep {
            definition,
            arguments,
        })
    }
}

fn convert_binding(
    definition: &StepDefinition,
    binding: Binding,
) -> Result<(String, ArgValue), StepArgumentConversionError> {
    let Binding {
        name,
        raw,
        converter,
    } = binding;
    let Some(convert) = definition.converter(&name).or(converter.as_ref()) else {
        return Ok((name, ArgValue::new(raw)));
    };
    match convert(&raw) {
        Ok(value) => Ok((name, value)),
        Err(cause) => Err(StepArgumentConversionError {
            argument: name,
            value: raw,
            definition: definition.describe(),
            cause,
        }),
    }
}
