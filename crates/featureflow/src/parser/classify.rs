//! Maps raw engine diagnostics onto structured error kinds.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Category of a grammar error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A feature-level structure problem.
    Feature,
    /// A misplaced or repeated background.
    Background,
    /// A misplaced scenario.
    Scenario,
    /// A step in the wrong place or order.
    Step,
    /// A misplaced rule.
    Rule,
    /// Any other unexpected token.
    Token,
    /// A diagnostic that matched no known shape.
    Unknown,
}

impl ParseErrorKind {
    /// Name used when rendering the error, e.g. `Background` in
    /// `BackgroundError`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "Feature",
            Self::Background => "Background",
            Self::Scenario => "Scenario",
            Self::Step => "Step",
            Self::Rule => "Rule",
            Self::Token => "Token",
            Self::Unknown => "GherkinParse",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Rule {
    pattern: Regex,
    kind: ParseErrorKind,
    message: &'static str,
}

const RULE_SOURCES: [(&str, ParseErrorKind, &str); 7] = [
    (
        r"expected:.*got 'Feature.*'",
        ParseErrorKind::Feature,
        "Multiple features are not allowed in a single feature file.",
    ),
    (
        r"expected:.*got '(?:Given|When|Then|And|But).*'",
        ParseErrorKind::Feature,
        "Step definition outside of a Scenario or a Background.",
    ),
    (
        r"expected:.*got 'Background.*'",
        ParseErrorKind::Background,
        "Multiple 'Background' sections detected. Only one 'Background' is allowed per feature.",
    ),
    (
        r"expected:.*got 'Scenario.*'",
        ParseErrorKind::Scenario,
        "Misplaced or incorrect 'Scenario' keyword. Ensure it's correctly placed. There might be a missing Feature section.",
    ),
    (
        r"expected:.*got 'Given.*'",
        ParseErrorKind::Step,
        "Improper step keyword detected. Ensure correct order and indentation for steps (Given, When, Then, etc.).",
    ),
    (
        r"expected:.*got 'Rule.*'",
        ParseErrorKind::Rule,
        "Misplaced or incorrectly formatted 'Rule'. Ensure it follows the feature structure.",
    ),
    (
        r"expected:.*got '.*'",
        ParseErrorKind::Token,
        "Unexpected token found. Check Gherkin syntax near the reported error.",
    ),
];

// Order matters: the first matching rule wins.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .map(|&(source, kind, message)| Rule {
            pattern: Regex::new(source)
                .unwrap_or_else(|_| unreachable!("classification patterns are valid")),
            kind,
            message,
        })
        .collect()
});

/// Classify a raw diagnostic.
///
/// Lines are checked in order and, per line, rules in order; the first hit
/// decides. Without a hit the kind is [`ParseErrorKind::Unknown`] and the
/// message embeds the raw text.
pub(crate) fn classify(raw: &str) -> (ParseErrorKind, String) {
    for line in raw.lines() {
        if let Some(rule) = RULES.iter().find(|rule| rule.pattern.is_match(line)) {
            return (rule.kind, rule.message.to_owned());
        }
    }
    log::warn!("unclassified grammar failure: {raw}");
    (
        ParseErrorKind::Unknown,
        format!("Unknown parsing error: {raw}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("(3:1): expected: #EOF, got 'Feature: Another'", ParseErrorKind::Feature)]
    #[case("(2:1): expected: #Language, got 'Given a step'", ParseErrorKind::Feature)]
    #[case("(2:1): expected: #TagLine, got 'And more'", ParseErrorKind::Feature)]
    #[case("(9:3): expected: #EOF, got 'Background: again'", ParseErrorKind::Background)]
    #[case("(1:1): expected: #Feature, got 'Scenario: orphan'", ParseErrorKind::Scenario)]
    #[case("(4:3): expected: #EOF, got 'Rule: late'", ParseErrorKind::Rule)]
    #[case("(5:3): expected: #StepLine, got '| a | b |'", ParseErrorKind::Token)]
    fn classifies_by_first_matching_rule(#[case] raw: &str, #[case] kind: ParseErrorKind) {
        assert_eq!(classify(raw).0, kind);
    }

    #[test]
    fn background_message_states_single_background() {
        let (kind, message) = classify("(7:3): expected: #EOF, got 'Background: twice'");
        assert_eq!(kind, ParseErrorKind::Background);
        assert!(message.contains("Only one 'Background' is allowed per feature."));
    }

    #[test]
    fn checks_lines_in_order() {
        let raw = "inconsistent cell count\n(4:5): expected: #EOF, got 'Rule: x'";
        assert_eq!(classify(raw).0, ParseErrorKind::Rule);
    }

    #[test]
    fn unknown_diagnostics_keep_raw_text() {
        let (kind, message) = classify("something odd");
        assert_eq!(kind, ParseErrorKind::Unknown);
        assert_eq!(message, "Unknown parsing error: something odd");
        assert_eq!(kind.to_string(), "GherkinParse");
    }
}
