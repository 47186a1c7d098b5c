//! Scenario execution.
//!
//! A [`ScenarioRunner`] drives one concrete scenario: the background steps
//! first, then the scenario steps. Each step is resolved against the
//! registry, its arguments are assembled and its handler is called. The first
//! failing step stops the scenario.

mod arguments;
mod error;
mod fixtures;
mod hooks;
mod outcome;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use featureflow_patterns::StepKeyword;

pub use arguments::{
    DATATABLE, DATATABLE_COLUMNS, DATATABLE_TRANSPOSED, DOCSTRING, RESERVED_PARAMETERS,
    StepArguments,
};
pub use error::{ExecutionError, StepError};
pub use fixtures::{FixtureMap, FixtureResolver, NoFixtures};
pub use hooks::{NoHooks, ScenarioHooks};
pub use outcome::{ScenarioOutcome, ScenarioStatus, StepFailure};

use crate::model::{Background, KeywordType, Scenario, Step};
use crate::outline::ScenarioCase;
use crate::panic::panic_message;
use crate::registry::{ArgValue, ResolvedStep, StepRegistry};

/// Keyword a step is resolved under.
///
/// Conjunctions and `*` steps take the keyword of the nearest preceding
/// primary step in `previous`, or `Given` at the start of a block.
fn resolve_keyword(step: &Step, previous: &mut Option<StepKeyword>) -> StepKeyword {
    let written = match step.keyword_type {
        KeywordType::Context => StepKeyword::Given,
        KeywordType::Action => StepKeyword::When,
        KeywordType::Outcome => StepKeyword::Then,
        KeywordType::Conjunction => StepKeyword::And,
        KeywordType::Unknown => step.keyword.parse().unwrap_or(StepKeyword::And),
    };
    written.resolve(previous)
}

/// Value of a reserved parameter, taken from the step itself.
fn reserved_argument(step: &Step, name: &str) -> Option<Result<ArgValue, ExecutionError>> {
    let missing = |block: &'static str| ExecutionError::MissingStepBlock {
        name: name.to_owned(),
        block,
    };
    let table = step.data_table.as_ref();
    let value = match name {
        DATATABLE => table
            .map(|t| ArgValue::new(t.raw()))
            .ok_or_else(|| missing("data table")),
        DATATABLE_TRANSPOSED => table
            .map(|t| ArgValue::new(t.transpose().raw()))
            .ok_or_else(|| missing("data table")),
        DATATABLE_COLUMNS => table.ok_or_else(|| missing("data table")).and_then(|t| {
            t.to_dict()
                .map(ArgValue::new)
                .map_err(ExecutionError::from)
        }),
        DOCSTRING => step
            .doc_string
            .as_ref()
            .map(|d| ArgValue::new(d.content.clone()))
            .ok_or_else(|| missing("doc string")),
        _ => return None,
    };
    Some(value)
}

/// Runs scenarios against a finished registry.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    registry: Arc<StepRegistry>,
}

impl ScenarioRunner {
    /// Take ownership of `registry`.
    #[must_use]
    pub fn new(registry: StepRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Share an existing registry.
    #[must_use]
    pub fn from_shared(registry: Arc<StepRegistry>) -> Self {
        Self { registry }
    }

    /// The registry steps are resolved against.
    #[must_use]
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Run `scenario` after `background` without fixtures or hooks.
    #[must_use]
    pub fn run(&self, scenario: &Scenario, background: Option<&Background>) -> ScenarioOutcome {
        self.run_with(scenario, background, &NoFixtures, &NoHooks)
    }

    /// Run a collected scenario case.
    #[must_use]
    pub fn run_case(
        &self,
        case: &ScenarioCase,
        fixtures: &dyn FixtureResolver,
        hooks: &dyn ScenarioHooks,
    ) -> ScenarioOutcome {
        self.run_with(
            &case.scenario.scenario,
            case.background.as_ref(),
            fixtures,
            hooks,
        )
    }

    /// Run `scenario` after `background`, filling handler parameters from
    /// `fixtures` and reporting progress to `hooks`.
    #[must_use]
    pub fn run_with(
        &self,
        scenario: &Scenario,
        background: Option<&Background>,
        fixtures: &dyn FixtureResolver,
        hooks: &dyn ScenarioHooks,
    ) -> ScenarioOutcome {
        let mut outcome = ScenarioOutcome::pending(&scenario.name);
        outcome.start();
        hooks.before_scenario(scenario);
        log::debug!("running scenario {:?}", scenario.name);

        let blocks = background
            .map(|b| b.steps.as_slice())
            .into_iter()
            .chain(std::iter::once(scenario.steps.as_slice()));
        'blocks: for steps in blocks {
            let mut previous = None;
            for step in steps {
                let keyword = resolve_keyword(step, &mut previous);
                if let Err(error) = self.run_step(step, keyword, fixtures, hooks) {
                    let failure = StepFailure {
                        location: step.location,
                        keyword,
                        text: step.text.clone(),
                        error,
                    };
                    log::debug!("scenario {:?} stopped: {failure}", scenario.name);
                    outcome.fail(failure);
                    break 'blocks;
                }
                outcome.steps_passed += 1;
            }
        }
        if outcome.status == ScenarioStatus::Running {
            outcome.pass();
        }
        hooks.after_scenario(scenario, &outcome);
        outcome
    }

    fn run_step(
        &self,
        step: &Step,
        keyword: StepKeyword,
        fixtures: &dyn FixtureResolver,
        hooks: &dyn ScenarioHooks,
    ) -> Result<(), ExecutionError> {
        log::trace!("step `{keyword} {}` at line {}", step.text, step.location.line);
        let prepared = self
            .registry
            .resolve_step(step, keyword)
            .map_err(ExecutionError::from)
            .and_then(|resolved| {
                let arguments = assemble_arguments(step, &resolved, fixtures)?;
                Ok((resolved, arguments))
            });
        let (resolved, arguments) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => {
                hooks.step_lookup_error(step, &error);
                return Err(error);
            }
        };

        hooks.before_step(step);
        let result = catch_unwind(AssertUnwindSafe(|| resolved.definition.invoke(&arguments)))
            .unwrap_or_else(|payload| Err(StepError::Panic(panic_message(payload.as_ref()))));
        match result {
            Ok(()) => {
                hooks.after_step(step);
                Ok(())
            }
            Err(error) => {
                hooks.step_error(step, &error);
                Err(ExecutionError::Handler(error))
            }
        }
    }
}

fn assemble_arguments(
    step: &Step,
    resolved: &ResolvedStep<'_>,
    fixtures: &dyn FixtureResolver,
) -> Result<StepArguments, ExecutionError> {
    let mut arguments: StepArguments = resolved.arguments.iter().cloned().collect();
    for name in resolved.definition.parameters() {
        if arguments.contains(name) {
            continue;
        }
        let value = match reserved_argument(step, name) {
            Some(value) => value?,
            None => fixtures
                .resolve(name)
                .ok_or_else(|| ExecutionError::MissingFixture {
                    name: name.clone(),
                    definition: resolved.definition.describe(),
                })?,
        };
        arguments.insert(name.clone(), value);
    }
    Ok(arguments)
}
