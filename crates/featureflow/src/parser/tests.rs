//! Unit tests for feature-file parsing.

use std::error::Error as _;
use std::io::Write as _;
use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::model::{FeatureChild, KeywordType, Location, Row};

struct StubEngine(Result<Value, EngineFailure>);

impl GrammarEngine for StubEngine {
    fn parse(&self, _source: &str, _language: &str) -> Result<Value, EngineFailure> {
        self.0.clone()
    }
}

fn stub_parser(outcome: Result<Value, EngineFailure>) -> FeatureParser {
    FeatureParser::with_engine(ParserConfig::default(), Arc::new(StubEngine(outcome)))
}

const TWO_BACKGROUNDS: &str = "\
Feature: Accounts
  Background: first
    Given a bank
  Background: again
    Given another bank
";

const LEDGER: &str = "\
# language: en
@ledger
Feature: Ledger
  Keeps the books

  Background:
    Given an empty ledger

  # outline below
  Scenario Outline: booking <amount>
    When I book <amount> on \"<account>\"
      | account   | amount   |
      | <account> | <amount> |
    Then the ledger says
      \"\"\"
      booked <amount>
      \"\"\"
    And the balance is <amount>

    @small
    Examples: small
      | account | amount |
      | cash    | 5      |
      | bank    | 7      |

  Rule: Closing
    Scenario: close the books
      Given the ledger is balanced
      * it is closed
";

#[fixture]
fn ledger_file() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let path = dir.path().join("ledger.feature");
    let mut file = std::fs::File::create(&path).unwrap_or_else(|err| panic!("create: {err}"));
    file.write_all(LEDGER.as_bytes())
        .unwrap_or_else(|err| panic!("write: {err}"));
    let path = Utf8PathBuf::from_path_buf(path).unwrap_or_else(|p| panic!("non-UTF-8 path {p:?}"));
    (dir, path)
}

#[test]
fn classifies_engine_failures() {
    let failure = EngineFailure::at(
        Location::new(4, 3),
        "(4:3): expected: #EOF, got 'Background: again'",
    );
    let parser = stub_parser(Err(failure.clone()));
    let Err(err) = parser.parse_str(TWO_BACKGROUNDS, "accounts.feature") else {
        panic!("two backgrounds must be rejected");
    };
    let Some(grammar) = err.as_grammar() else {
        panic!("expected a grammar error, got {err:?}");
    };
    assert_eq!(grammar.kind, ParseErrorKind::Background);
    assert_eq!(grammar.line, 4);
    assert_eq!(grammar.line_content, "  Background: again");
    assert_eq!(grammar.filename, "accounts.feature");
    assert_eq!(grammar.source, failure);
    assert!(grammar.source().is_some());
    assert_eq!(
        grammar.to_string(),
        "BackgroundError: Multiple 'Background' sections detected. Only one 'Background' \
         is allowed per feature.\nLine number: 4\nLine:   Background: again\nFile: accounts.feature"
    );
}

#[rstest]
#[case(Vec::new())]
#[case(vec![Location::new(99, 1)])]
fn out_of_range_lines_have_no_content(#[case] locations: Vec<Location>) {
    let failure = EngineFailure {
        message: "engine gave up".to_owned(),
        locations,
    };
    let Err(err) = stub_parser(Err(failure)).parse_str(TWO_BACKGROUNDS, "x.feature") else {
        panic!("failure expected");
    };
    let Some(grammar) = err.as_grammar() else {
        panic!("expected a grammar error, got {err:?}");
    };
    assert_eq!(grammar.kind, ParseErrorKind::Unknown);
    assert_eq!(grammar.message, "Unknown parsing error: engine gave up");
    assert_eq!(grammar.line_content, "");
    assert!(grammar.to_string().starts_with("GherkinParseError: "));
}

#[test]
fn rejects_trees_that_do_not_fit_the_model() {
    let parser = stub_parser(Ok(json!({ "feature": { "name": "no location" } })));
    let Err(err) = parser.parse_str("Feature: x\n", "x.feature") else {
        panic!("malformed tree must be rejected");
    };
    assert!(matches!(err, ParseError::Document { ref filename, .. } if filename == "x.feature"));
}

#[rstest]
fn parses_a_feature_file(ledger_file: (tempfile::TempDir, Utf8PathBuf)) {
    let (_dir, path) = ledger_file;
    let doc = parse_feature_file(&path, SourceEncoding::Utf8)
        .unwrap_or_else(|err| panic!("ledger should parse: {err}"));
    let feature = &doc.feature;
    assert_eq!(feature.name, "Ledger");
    assert_eq!(feature.language, "en");
    assert_eq!(feature.location.line, 3);
    assert_eq!(feature.tags.first().map(|t| t.name.as_str()), Some("@ledger"));
    assert_eq!(doc.comments.len(), 1);

    let Some(background) = feature.background() else {
        panic!("background expected");
    };
    assert_eq!(background.steps.len(), 1);

    let scenarios: Vec<_> = feature.scenarios().collect();
    let [outline] = scenarios.as_slice() else {
        panic!("one top-level scenario expected, got {}", scenarios.len());
    };
    assert!(outline.is_templated());
    assert_eq!(outline.location.line, 10);
    let texts: Vec<&str> = outline.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "I book <amount> on \"<account>\"",
            "the ledger says",
            "the balance is <amount>",
        ]
    );
    let lines: Vec<usize> = outline.steps.iter().map(|s| s.location.line).collect();
    assert_eq!(lines, vec![11, 14, 18]);
    assert_eq!(
        outline.steps.last().map(|s| s.keyword_type),
        Some(KeywordType::Conjunction)
    );

    let Some(table) = outline.steps.first().and_then(|s| s.data_table.as_ref()) else {
        panic!("data table expected");
    };
    assert_eq!(
        table.raw(),
        vec![
            vec!["account".to_owned(), "amount".to_owned()],
            vec!["<account>".to_owned(), "<amount>".to_owned()],
        ]
    );
    let Some(doc_string) = outline.steps.get(1).and_then(|s| s.doc_string.as_ref()) else {
        panic!("doc string expected");
    };
    assert_eq!(doc_string.content, "booked <amount>");
    assert_eq!(doc_string.delimiter, "\"\"\"");

    let Some(examples) = outline.examples.first() else {
        panic!("examples expected");
    };
    assert_eq!(examples.parameter_names(), vec!["account", "amount"]);
    assert_eq!(examples.table_body.len(), 2);
    assert_eq!(examples.tags.first().map(|t| t.name.as_str()), Some("@small"));

    let rules: Vec<_> = feature.rules().collect();
    let [rule] = rules.as_slice() else {
        panic!("one rule expected");
    };
    assert_eq!(rule.name, "Closing");
    let rule_steps: Vec<KeywordType> = rule
        .scenarios()
        .flat_map(|s| s.steps.iter().map(|step| step.keyword_type))
        .collect();
    assert_eq!(rule_steps, vec![KeywordType::Context, KeywordType::Conjunction]);
    assert!(matches!(feature.children.last(), Some(FeatureChild::Rule(_))));
}

#[rstest]
fn parsing_twice_yields_equal_documents(ledger_file: (tempfile::TempDir, Utf8PathBuf)) {
    let (_dir, path) = ledger_file;
    let parser = FeatureParser::default();
    let first = parser
        .parse_path(&path)
        .unwrap_or_else(|err| panic!("first parse: {err}"));
    let second = parser
        .parse_path(&path)
        .unwrap_or_else(|err| panic!("second parse: {err}"));
    assert_eq!(first, second);
}

#[test]
fn missing_files_are_io_errors() {
    let Err(err) = parse_feature_file("/nonexistent/nowhere.feature", SourceEncoding::Utf8) else {
        panic!("missing file must fail");
    };
    assert!(matches!(err, ParseError::Io { .. }));
}

#[test]
fn undecodable_bytes_are_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|err| panic!("temp: {err}"));
    file.write_all(b"Feature: caf\xE9\n")
        .unwrap_or_else(|err| panic!("write: {err}"));
    let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf())
        .unwrap_or_else(|p| panic!("non-UTF-8 path {p:?}"));

    let Err(err) = parse_feature_file(&path, SourceEncoding::Utf8) else {
        panic!("invalid UTF-8 must fail");
    };
    assert!(matches!(
        err,
        ParseError::Decode { encoding: SourceEncoding::Utf8, .. }
    ));

    let doc = parse_feature_file(&path, SourceEncoding::Latin1)
        .unwrap_or_else(|err| panic!("latin-1 should decode: {err}"));
    assert_eq!(doc.feature.name, "café");
}

#[rstest]
#[case::two_features(
    "Feature: Shop\n  Scenario: a\n    Given b\nFeature: Till\n",
    ParseErrorKind::Feature,
    "Multiple features are not allowed in a single feature file.",
    4,
    "Feature: Till"
)]
#[case::two_backgrounds(
    TWO_BACKGROUNDS,
    ParseErrorKind::Background,
    "Multiple 'Background' sections detected. Only one 'Background' is allowed per feature.",
    4,
    "  Background: again"
)]
#[case::scenario_before_feature(
    "Scenario: early\n  Given a\nFeature: Shop\n",
    ParseErrorKind::Scenario,
    "Misplaced or incorrect 'Scenario' keyword. Ensure it's correctly placed. There might be a missing Feature section.",
    1,
    "Scenario: early"
)]
#[case::stray_step(
    "Given a stray step\n",
    ParseErrorKind::Feature,
    "Step definition outside of a Scenario or a Background.",
    1,
    "Given a stray step"
)]
#[case::tagged_step(
    "Feature: Shop\n  Scenario: a\n    @slow\n    Given b\n",
    ParseErrorKind::Feature,
    "Step definition outside of a Scenario or a Background.",
    4,
    "    Given b"
)]
#[case::rule_before_feature(
    "Rule: first\nFeature: Shop\n",
    ParseErrorKind::Rule,
    "Misplaced or incorrectly formatted 'Rule'. Ensure it follows the feature structure.",
    1,
    "Rule: first"
)]
#[case::stray_token(
    "Feature: Shop\n  Scenario: a\n    Given b\n    loose words\n",
    ParseErrorKind::Token,
    "Unexpected token found. Check Gherkin syntax near the reported error.",
    4,
    "    loose words"
)]
fn real_engine_points_at_the_offending_line(
    #[case] source: &str,
    #[case] kind: ParseErrorKind,
    #[case] message: &str,
    #[case] line: usize,
    #[case] line_content: &str,
) {
    let Err(err) = FeatureParser::default().parse_str(source, "shop.feature") else {
        panic!("the source must be rejected");
    };
    let Some(grammar) = err.as_grammar() else {
        panic!("expected a grammar error, got {err:?}");
    };
    assert_eq!(
        (grammar.kind, grammar.message.as_str(), grammar.line, grammar.line_content.as_str()),
        (kind, message, line, line_content),
        "engine diagnostic: {}",
        grammar.source
    );
    assert_eq!(grammar.filename, "shop.feature");
    assert_eq!(grammar.to_string().lines().last(), Some("File: shop.feature"));
}

#[test]
fn escaped_cells_keep_their_columns() {
    let source = "\
Feature: Escapes
  Scenario: cells
    Given the table
      | v\\|w | p\\\\q | n\\nl |
";
    let doc = FeatureParser::default()
        .parse_str(source, "escapes.feature")
        .unwrap_or_else(|err| panic!("escaped cells should parse: {err}"));
    let Some(scenario) = doc.feature.scenarios().next() else {
        panic!("one scenario expected");
    };
    let Some(table) = scenario.steps.first().and_then(|step| step.data_table.as_ref()) else {
        panic!("the step carries a data table");
    };
    let rows: Vec<Vec<String>> = table.rows.iter().map(Row::values).collect();
    assert_eq!(rows, vec![vec!["v|w".to_owned(), r"p\\q".to_owned(), "n\nl".to_owned()]]);
    let columns: Vec<usize> = table
        .rows
        .iter()
        .flat_map(|row| row.cells.iter().map(|cell| cell.location.column))
        .collect();
    assert_eq!(columns, vec![9, 16, 23]);
}
