//! Collection of every runnable scenario in a feature.

use super::{ConcreteScenario, expand};
use crate::model::{Background, Feature, FeatureChild, RuleChild};

/// One concrete scenario with the context it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCase {
    /// Name of the enclosing feature.
    pub feature_name: String,
    /// Name of the enclosing rule, if any.
    pub rule_name: Option<String>,
    /// The scenario to run.
    pub scenario: ConcreteScenario,
    /// Nearest enclosing background.
    pub background: Option<Background>,
}

/// Expand every scenario of `feature`, rules included, in document order.
///
/// A scenario inside a rule gets the rule's background when the rule has
/// one, otherwise the feature's.
#[must_use]
pub fn compile_feature(feature: &Feature) -> Vec<ScenarioCase> {
    let feature_background = feature.background();
    let mut cases = Vec::new();
    for child in &feature.children {
        match child {
            FeatureChild::Background(_) => {}
            FeatureChild::Scenario(scenario) => {
                cases.extend(expand(scenario).into_iter().map(|concrete| ScenarioCase {
                    feature_name: feature.name.clone(),
                    rule_name: None,
                    scenario: concrete,
                    background: feature_background.cloned(),
                }));
            }
            FeatureChild::Rule(rule) => {
                let background = rule.background().or(feature_background);
                for rule_child in &rule.children {
                    let RuleChild::Scenario(scenario) = rule_child else {
                        continue;
                    };
                    cases.extend(expand(scenario).into_iter().map(|concrete| ScenarioCase {
                        feature_name: feature.name.clone(),
                        rule_name: Some(rule.name.clone()),
                        scenario: concrete,
                        background: background.cloned(),
                    }));
                }
            }
        }
    }
    log::debug!(
        "compiled feature {:?} into {} scenario cases",
        feature.name,
        cases.len()
    );
    cases
}
