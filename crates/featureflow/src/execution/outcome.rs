//! Scenario results.

use std::fmt;

use featureflow_patterns::StepKeyword;

use super::error::ExecutionError;
use crate::model::Location;

/// Where a scenario is in its lifecycle.
///
/// A scenario moves from `Pending` to `Running` and ends in exactly one of
/// `Passed`, `Failed` or `Errored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioStatus {
    /// Not started.
    Pending,
    /// Steps are executing.
    Running,
    /// Every step passed.
    Passed,
    /// A handler returned an error or panicked.
    Failed,
    /// A step could not be run at all.
    Errored,
}

impl ScenarioStatus {
    /// Whether the status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Errored)
    }

    /// Lowercase name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step that stopped a scenario.
#[derive(Debug)]
pub struct StepFailure {
    /// Location of the step in its feature file.
    pub location: Location,
    /// Keyword the step was resolved under.
    pub keyword: StepKeyword,
    /// Rendered step text.
    pub text: String,
    /// What went wrong.
    pub error: ExecutionError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step `{} {}` at line {}, column {}: {}",
            self.keyword, self.text, self.location.line, self.location.column, self.error
        )
    }
}

/// Result of running one scenario.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Final status.
    pub status: ScenarioStatus,
    /// Number of steps whose handler completed, background included.
    pub steps_passed: usize,
    /// The failing step, for `Failed` and `Errored` outcomes.
    pub failure: Option<StepFailure>,
}

impl ScenarioOutcome {
    pub(crate) fn pending(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: ScenarioStatus::Pending,
            steps_passed: 0,
            failure: None,
        }
    }

    pub(crate) fn start(&mut self) {
        debug_assert_eq!(self.status, ScenarioStatus::Pending);
        self.status = ScenarioStatus::Running;
    }

    pub(crate) fn pass(&mut self) {
        debug_assert_eq!(self.status, ScenarioStatus::Running);
        self.status = ScenarioStatus::Passed;
    }

    pub(crate) fn fail(&mut self, failure: StepFailure) {
        debug_assert_eq!(self.status, ScenarioStatus::Running);
        self.status = if failure.error.is_handler_failure() {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::Errored
        };
        self.failure = Some(failure);
    }

    /// Whether the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}
