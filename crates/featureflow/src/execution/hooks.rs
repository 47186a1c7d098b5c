//! Observation points around scenario and step execution.

use super::error::{ExecutionError, StepError};
use super::outcome::ScenarioOutcome;
use crate::model::{Scenario, Step};

/// Callbacks invoked while a scenario runs. Every method defaults to doing
/// nothing.
pub trait ScenarioHooks {
    /// Before the first step.
    fn before_scenario(&self, _scenario: &Scenario) {}

    /// After the scenario finished, whatever its status.
    fn after_scenario(&self, _scenario: &Scenario, _outcome: &ScenarioOutcome) {}

    /// After resolution, right before the handler runs.
    fn before_step(&self, _step: &Step) {}

    /// After the handler returned successfully.
    fn after_step(&self, _step: &Step) {}

    /// The handler returned an error or panicked.
    fn step_error(&self, _step: &Step, _error: &StepError) {}

    /// The step could not be prepared: resolution, conversion or argument
    /// assembly failed.
    fn step_lookup_error(&self, _step: &Step, _error: &ExecutionError) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ScenarioHooks for NoHooks {}
