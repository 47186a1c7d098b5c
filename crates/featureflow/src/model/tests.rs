//! Unit tests for the document model.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

fn loc(line: usize, column: usize) -> serde_json::Value {
    json!({ "line": line, "column": column })
}

fn row(id: &str, line: usize, values: &[&str]) -> serde_json::Value {
    let cells: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, v)| json!({ "location": loc(line, 7 + i * 4), "value": v }))
        .collect();
    json!({ "id": id, "location": loc(line, 5), "cells": cells })
}

fn table(rows: &[&[&str]]) -> DataTable {
    let rows: Vec<_> = rows
        .iter()
        .enumerate()
        .map(|(i, values)| row(&i.to_string(), 10 + i, values))
        .collect();
    serde_json::from_value(json!({ "location": loc(10, 5), "rows": rows }))
        .unwrap_or_else(|err| panic!("table should deserialize: {err}"))
}

#[fixture]
fn document_json() -> serde_json::Value {
    json!({
        "feature": {
            "location": loc(2, 1),
            "tags": [{ "id": "9", "location": loc(1, 1), "name": "@billing" }],
            "language": "en",
            "keyword": "Feature",
            "name": "Invoices",
            "description": "  Keep the books straight",
            "children": [
                { "background": {
                    "id": "1", "location": loc(5, 3), "keyword": "Background",
                    "name": "", "description": "",
                    "steps": [{
                        "id": "0", "location": loc(6, 5), "keyword": "Given ",
                        "keywordType": "Context", "text": "a ledger"
                    }]
                }},
                { "rule": {
                    "id": "8", "location": loc(8, 3), "tags": [], "keyword": "Rule",
                    "name": "Totals", "description": "",
                    "children": [{ "scenario": {
                        "id": "7", "location": loc(9, 5), "tags": [],
                        "keyword": "Scenario", "name": "sum", "description": "",
                        "steps": [{
                            "id": "6", "location": loc(10, 7), "keyword": "Then",
                            "keywordType": "Outcome", "text": "the total is shown",
                            "docString": {
                                "location": loc(11, 9),
                                "content": "    line one\n      line two",
                                "delimiter": "\"\"\"",
                                "mediaType": "text"
                            }
                        }],
                        "examples": []
                    }}]
                }}
            ]
        },
        "comments": [{ "location": loc(4, 1), "text": "# note" }]
    })
}

#[rstest]
fn loads_document_tree(document_json: serde_json::Value) {
    let doc = GherkinDocument::from_json(document_json)
        .unwrap_or_else(|err| panic!("document should load: {err}"));
    let feature = &doc.feature;
    assert_eq!(feature.name, "Invoices");
    assert_eq!(feature.tags.first().map(Tag::label), Some("billing"));
    assert_eq!(doc.comments.len(), 1);

    let background = feature.background().unwrap_or_else(|| panic!("background"));
    let step = background.steps.first().unwrap_or_else(|| panic!("step"));
    assert_eq!(step.keyword, "Given");
    assert_eq!(step.keyword_type, KeywordType::Context);

    let rule = feature.rules().next().unwrap_or_else(|| panic!("rule"));
    assert!(rule.background().is_none());
    let scenario = rule.scenarios().next().unwrap_or_else(|| panic!("scenario"));
    assert!(!scenario.is_templated());
    let doc_string = scenario
        .steps
        .first()
        .and_then(|s| s.doc_string.as_ref())
        .unwrap_or_else(|| panic!("doc string"));
    assert_eq!(doc_string.content, "line one\n  line two");
    assert_eq!(doc_string.media_type.as_deref(), Some("text"));
    assert_eq!(feature.scenarios().count(), 0);
}

#[rstest]
fn serialisation_round_trips(document_json: serde_json::Value) {
    let doc = GherkinDocument::from_json(document_json)
        .unwrap_or_else(|err| panic!("document should load: {err}"));
    let value = serde_json::to_value(&doc).unwrap_or_else(|err| panic!("serialize: {err}"));
    let again =
        GherkinDocument::from_json(value).unwrap_or_else(|err| panic!("reload: {err}"));
    assert_eq!(doc, again);
}

#[rstest]
fn rejects_missing_required_key(mut document_json: serde_json::Value) {
    if let Some(feature) = document_json
        .get_mut("feature")
        .and_then(serde_json::Value::as_object_mut)
    {
        feature.remove("name");
    }
    assert!(GherkinDocument::from_json(document_json).is_err());
}

#[test]
fn rejects_child_with_two_kinds() {
    let child = json!({
        "background": {
            "id": "1", "location": loc(1, 1), "keyword": "Background",
            "name": "", "description": "", "steps": []
        },
        "scenario": {
            "id": "2", "location": loc(2, 1), "tags": [], "keyword": "Scenario",
            "name": "", "description": "", "steps": []
        }
    });
    assert!(serde_json::from_value::<FeatureChild>(child).is_err());
}

#[test]
fn rule_children_cannot_be_rules() {
    let child = json!({ "rule": {
        "id": "1", "location": loc(1, 1), "tags": [], "keyword": "Rule",
        "name": "", "description": "", "children": []
    }});
    assert!(serde_json::from_value::<RuleChild>(child).is_err());
}

#[rstest]
#[case(r"plain", r"plain")]
#[case(r"a\b", r"a\\b")]
#[case(r"a\\b", r"a\\b")]
#[case(r"\\\", r"\\\\")]
fn escapes_cells_idempotently(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(to_raw_string(input), expected);
    assert_eq!(to_raw_string(&to_raw_string(input)), expected);
}

#[test]
fn cells_are_escaped_on_load() {
    let data = table(&[&[r"C:\temp"]]);
    assert_eq!(data.raw(), vec![vec![r"C:\\temp".to_owned()]]);
}

#[test]
fn dedent_is_stable() {
    let once = dedent("  a\n\n    b\n");
    assert_eq!(once, "a\n\n  b\n");
    assert_eq!(dedent(&once), once);
}

#[rstest]
#[case("\t  a\n\t    b", "a\n  b")]
#[case("\ta\n    b", "\ta\n    b")]
#[case("  \tx\n   y", "\tx\n y")]
#[case("    é\n    ü", "é\nü")]
fn dedent_compares_whitespace_as_text(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(dedent(input), expected);
}

#[test]
fn to_dict_maps_headers_to_columns() {
    let data = table(&[&["a", "b"], &["1", "2"], &["3", "4"]]);
    let dict = data
        .to_dict()
        .unwrap_or_else(|err| panic!("two rows or more: {err}"));
    assert_eq!(dict.get("a"), Some(&vec!["1".to_owned(), "3".to_owned()]));
    assert_eq!(dict.get("b"), Some(&vec!["2".to_owned(), "4".to_owned()]));
}

#[test]
fn to_dict_rejects_single_row() {
    let data = table(&[&["a", "b"]]);
    let Err(err) = data.to_dict() else {
        panic!("a header-only table cannot be mapped");
    };
    assert_eq!(err.rows, 1);
    assert!(err.to_string().contains("at least two rows"));
}

#[test]
fn transpose_swaps_rows_and_columns() {
    let data = table(&[&["a", "b", "c"], &["1", "2", "3"]]);
    let transposed = data.transpose();
    assert_eq!(
        transposed.raw(),
        vec![
            vec!["a".to_owned(), "1".to_owned()],
            vec!["b".to_owned(), "2".to_owned()],
            vec!["c".to_owned(), "3".to_owned()],
        ]
    );
    let ids: Vec<_> = transposed.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["0", "1", "2"]);
    assert!(transposed.rows.iter().all(|r| r.location == data.location));
    assert_eq!(transposed.transpose().raw(), data.raw());
}

#[test]
fn examples_table_lists_parameters() {
    let examples: ExamplesTable = serde_json::from_value(json!({
        "id": "3",
        "location": loc(12, 5),
        "keyword": "Examples",
        "tableHeader": row("1", 13, &["start", "eat"]),
        "tableBody": [row("2", 14, &["12", "5"])]
    }))
    .unwrap_or_else(|err| panic!("examples should load: {err}"));
    assert_eq!(examples.parameter_names(), ["start", "eat"]);
    assert!(examples.name.is_none());
    assert!(examples.tags.is_empty());
}
