//! Link-time step collection.
//!
//! The [`step!`](crate::step) macro submits a [`SubmittedStep`] through
//! `inventory`; [`StepRegistryBuilder::collect_submitted`](super::StepRegistryBuilder::collect_submitted)
//! turns every submission into a [`StepDefinition`](super::StepDefinition).

use featureflow_patterns::StepKeyword;

use crate::execution::{StepArguments, StepError};

/// Plain function signature used by submitted steps.
pub type StepFn = fn(&StepArguments) -> Result<(), StepError>;

/// A step definition submitted at link time.
#[derive(Debug)]
pub struct SubmittedStep {
    /// Keyword the step is registered under.
    pub keyword: StepKeyword,
    /// Format-style pattern.
    pub pattern: &'static str,
    /// Function run for matching steps.
    pub handler: StepFn,
    /// Handler parameters not bound by the pattern.
    pub parameters: &'static [&'static str],
    /// Source file where the step is defined.
    pub file: &'static str,
    /// Line number within the source file.
    pub line: u32,
}

inventory::collect!(SubmittedStep);

/// Every submitted step, in no particular order.
pub(crate) fn submitted() -> impl Iterator<Item = &'static SubmittedStep> {
    inventory::iter::<SubmittedStep>.into_iter()
}

/// Submit a step definition for collection by
/// [`StepRegistryBuilder::collect_submitted`](crate::registry::StepRegistryBuilder::collect_submitted).
///
/// # Forms
///
/// ```ignore
/// step!(StepKeyword::Given, "a basket with {count:u32} items", basket_with_items);
/// step!(StepKeyword::Then, "the totals are", totals_are, &["datatable"]);
/// ```
///
/// The optional trailing slice names handler parameters the pattern does not
/// bind.
#[macro_export]
macro_rules! step {
    ($keyword:expr, $pattern:expr, $handler:path, & $parameters:expr $(,)?) => {
        const _: () = {
            $crate::submit! {
                $crate::registry::SubmittedStep {
                    keyword: $keyword,
                    pattern: $pattern,
                    handler: $handler,
                    parameters: &$parameters,
                    file: file!(),
                    line: line!(),
                }
            }
        };
    };

    ($keyword:expr, $pattern:expr, $handler:path $(,)?) => {
        $crate::step!($keyword, $pattern, $handler, &[]);
    };
}
