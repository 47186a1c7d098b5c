//! Typed, location-tracked representation of a parsed feature file.
//!
//! The node types mirror the Gherkin JSON document tree and deserialize
//! straight from it. Every node keeps the [`Location`] assigned at parse time.
//! Feature and rule children are externally tagged, so a child object must
//! carry exactly one of `background`, `rule` or `scenario`.

mod table;

use serde::{Deserialize, Serialize};

pub use table::{Cell, DataTable, DataTableShapeError, DocString, Row, dedent, to_raw_string};

/// A 1-based line and column in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A comment line. Comments are kept for tooling and never executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Location of the `#`.
    pub location: Location,
    /// The full source line.
    pub text: String,
}

/// A tag such as `@slow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Node identifier.
    pub id: String,
    /// Location of the tag.
    pub location: Location,
    /// Tag name as written, including the leading `@`.
    pub name: String,
}

impl Tag {
    /// The tag name without its leading `@`.
    ///
    /// # Examples
    /// ```
    /// use featureflow::model::{Location, Tag};
    ///
    /// let tag = Tag { id: "0".into(), location: Location::new(1, 1), name: "@slow".into() };
    /// assert_eq!(tag.label(), "slow");
    /// ```
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.strip_prefix('@').unwrap_or(&self.name)
    }
}

/// Semantic category of a step keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordType {
    /// `Given` and its translations.
    Context,
    /// `When` and its translations.
    Action,
    /// `Then` and its translations.
    Outcome,
    /// `And`, `But` and `*`.
    Conjunction,
    /// A keyword the dialect does not classify.
    Unknown,
}

/// A single step line with its optional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Node identifier.
    pub id: String,
    /// Location of the keyword.
    pub location: Location,
    /// The keyword as written, trimmed.
    #[serde(deserialize_with = "trimmed")]
    pub keyword: String,
    /// Semantic category of the keyword.
    pub keyword_type: KeywordType,
    /// Step text following the keyword.
    pub text: String,
    /// Attached data table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_table: Option<DataTable>,
    /// Attached doc string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<DocString>,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_owned())
}

/// An `Examples` table attached to a scenario outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplesTable {
    /// Node identifier.
    pub id: String,
    /// Location of the `Examples` keyword.
    pub location: Location,
    /// Tags applied to this table only.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// The keyword as written.
    #[serde(default)]
    pub keyword: String,
    /// Optional table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free text below the keyword line.
    #[serde(default)]
    pub description: String,
    /// Header row naming the parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_header: Option<Row>,
    /// One row per concrete scenario.
    #[serde(default)]
    pub table_body: Vec<Row>,
}

impl ExamplesTable {
    /// Parameter names in header order; empty when the table has no header.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        self.table_header
            .as_ref()
            .map(|header| header.cells.iter().map(|c| c.value.as_str()).collect())
            .unwrap_or_default()
    }
}

/// A scenario, scenario outline or example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Node identifier.
    pub id: String,
    /// Location of the keyword.
    pub location: Location,
    /// Tags written above the scenario.
    pub tags: Vec<Tag>,
    /// The keyword as written, e.g. `Scenario Outline`.
    pub keyword: String,
    /// Scenario name.
    pub name: String,
    /// Free text below the keyword line.
    pub description: String,
    /// Steps in source order.
    pub steps: Vec<Step>,
    /// Examples tables; empty for a plain scenario.
    #[serde(default)]
    pub examples: Vec<ExamplesTable>,
}

impl Scenario {
    /// Whether the scenario is a template expanded from Examples tables.
    #[must_use]
    pub fn is_templated(&self) -> bool {
        !self.examples.is_empty()
    }

    /// Tag labels without the leading `@`, in source order.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(Tag::label).collect()
    }
}

/// Steps shared by every scenario of a feature or rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    /// Node identifier.
    pub id: String,
    /// Location of the keyword.
    pub location: Location,
    /// The keyword as written.
    pub keyword: String,
    /// Optional name; empty when absent.
    pub name: String,
    /// Free text below the keyword line.
    pub description: String,
    /// Steps in source order.
    pub steps: Vec<Step>,
}

/// Children allowed directly under a [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleChild {
    /// The rule's own background.
    Background(Background),
    /// A scenario inside the rule.
    Scenario(Scenario),
}

/// A business rule grouping scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Node identifier.
    pub id: String,
    /// Location of the keyword.
    pub location: Location,
    /// Tags written above the rule. Child scenarios do not inherit them.
    pub tags: Vec<Tag>,
    /// The keyword as written.
    pub keyword: String,
    /// Rule name.
    pub name: String,
    /// Free text below the keyword line.
    pub description: String,
    /// Children in source order.
    pub children: Vec<RuleChild>,
}

impl Rule {
    /// The rule's background, if any.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.children.iter().find_map(|child| match child {
            RuleChild::Background(background) => Some(background),
            RuleChild::Scenario(_) => None,
        })
    }

    /// Scenarios declared in the rule.
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.children.iter().filter_map(|child| match child {
            RuleChild::Scenario(scenario) => Some(scenario),
            RuleChild::Background(_) => None,
        })
    }
}

/// Children allowed directly under a [`Feature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureChild {
    /// The feature background.
    Background(Background),
    /// A rule and its scenarios.
    Rule(Rule),
    /// A scenario outside any rule.
    Scenario(Scenario),
}

/// The root node of a feature file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Location of the keyword.
    pub location: Location,
    /// Tags written above the feature.
    pub tags: Vec<Tag>,
    /// Dialect language code, e.g. `en`.
    pub language: String,
    /// The keyword as written.
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Free text below the keyword line.
    pub description: String,
    /// Children in source order.
    pub children: Vec<FeatureChild>,
}

impl Feature {
    /// The feature-level background, if any.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.children.iter().find_map(|child| match child {
            FeatureChild::Background(background) => Some(background),
            _ => None,
        })
    }

    /// Scenarios declared directly under the feature.
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.children.iter().filter_map(|child| match child {
            FeatureChild::Scenario(scenario) => Some(scenario),
            _ => None,
        })
    }

    /// Rules declared in the feature.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.children.iter().filter_map(|child| match child {
            FeatureChild::Rule(rule) => Some(rule),
            _ => None,
        })
    }
}

/// A parsed feature file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GherkinDocument {
    /// The feature.
    pub feature: Feature,
    /// Comment lines in source order.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl GherkinDocument {
    /// Build a document from a Gherkin JSON document tree.
    ///
    /// # Errors
    /// Returns the deserialisation error when a required key is missing or a
    /// value has the wrong shape.
    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests;
