//! Scenario outline expansion.
//!
//! A templated scenario is rendered once per Examples body row. Every
//! `<name>` placeholder naming a column of the row is replaced in step text
//! and data table cells; other placeholders are left untouched.

mod cases;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

pub use cases::{ScenarioCase, compile_feature};

use crate::model::{ExamplesTable, Scenario, Step, Tag};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([^>\s][^>]*)>").unwrap_or_else(|_| unreachable!("placeholder regex is valid"))
});

/// The Examples row a concrete scenario was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRow {
    /// Index of the Examples table within the scenario.
    pub table_index: usize,
    /// Index of the body row within the table.
    pub row_index: usize,
    /// Column name and value pairs in header order.
    pub parameters: Vec<(String, String)>,
}

impl ExampleRow {
    /// Value of the column `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A scenario ready to run: no Examples, placeholders substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteScenario {
    /// The rendered scenario. Its `tags` hold the effective tags and its
    /// `examples` are always empty.
    pub scenario: Scenario,
    /// Source row, `None` for a scenario that was not templated.
    pub example: Option<ExampleRow>,
}

impl ConcreteScenario {
    /// Effective tag labels, without `@`.
    #[must_use]
    pub fn tag_labels(&self) -> BTreeSet<&str> {
        self.scenario.tags.iter().map(Tag::label).collect()
    }
}

/// Replace every `<name>` whose name is a key of `params`.
///
/// Substitution is a single pass, so values containing placeholders are not
/// expanded again. Unknown placeholders are kept verbatim.
///
/// # Examples
/// ```
/// use featureflow::outline::substitute_placeholders;
///
/// let params = vec![("count".to_owned(), "5".to_owned())];
/// assert_eq!(
///     substitute_placeholders("I have <count> <unit>", &params),
///     "I have 5 <unit>"
/// );
/// ```
#[must_use]
pub fn substitute_placeholders(text: &str, params: &[(String, String)]) -> String {
    let replaced: Cow<'_, str> = PLACEHOLDER_RE.replace_all(text, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let name = caps.get(1).map_or("", |m| m.as_str());
        params
            .iter()
            .find(|(column, _)| column == name)
            .map_or_else(|| whole.to_owned(), |(_, value)| value.clone())
    });
    replaced.into_owned()
}

fn render_step(step: &Step, params: &[(String, String)]) -> Step {
    let mut rendered = step.clone();
    rendered.text = substitute_placeholders(&step.text, params);
    if let Some(table) = rendered.data_table.as_mut() {
        for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
            cell.value = substitute_placeholders(&cell.value, params);
        }
    }
    rendered
}

/// Scenario tags followed by `extra` tags whose names are not present yet.
fn tag_union(scenario: &[Tag], extra: &[Tag]) -> Vec<Tag> {
    let mut merged = scenario.to_vec();
    for tag in extra {
        if !merged.iter().any(|seen| seen.name == tag.name) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Render body row `row_index` of `examples`, the table at `table_index`.
///
/// Returns `None` when the row does not exist.
#[must_use]
pub fn render(
    scenario: &Scenario,
    examples: &ExamplesTable,
    table_index: usize,
    row_index: usize,
) -> Option<ConcreteScenario> {
    let row = examples.table_body.get(row_index)?;
    let parameters: Vec<(String, String)> = examples
        .parameter_names()
        .into_iter()
        .zip(&row.cells)
        .map(|(name, cell)| (name.to_owned(), cell.value.clone()))
        .collect();
    let steps = scenario
        .steps
        .iter()
        .map(|step| render_step(step, &parameters))
        .collect();
    Some(ConcreteScenario {
        scenario: Scenario {
            tags: tag_union(&scenario.tags, &examples.tags),
            steps,
            examples: Vec::new(),
            ..scenario.clone()
        },
        example: Some(ExampleRow {
            table_index,
            row_index,
            parameters,
        }),
    })
}

/// Expand `scenario` into one concrete scenario per Examples body row.
///
/// Tables are visited in order and rows in order within each table. A
/// scenario without Examples yields itself.
#[must_use]
pub fn expand(scenario: &Scenario) -> Vec<ConcreteScenario> {
    if !scenario.is_templated() {
        return vec![ConcreteScenario {
            scenario: scenario.clone(),
            example: None,
        }];
    }
    let concrete: Vec<ConcreteScenario> = scenario
        .examples
        .iter()
        .enumerate()
        .flat_map(|(table_index, examples)| {
            (0..examples.table_body.len())
                .filter_map(move |row_index| render(scenario, examples, table_index, row_index))
        })
        .collect();
    log::debug!(
        "expanded scenario {:?} into {} concrete scenarios",
        scenario.name,
        concrete.len()
    );
    concrete
}

#[cfg(test)]
mod tests;
