//! Unit tests for outline expansion.

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::model::{Feature, GherkinDocument};

fn loc(line: usize) -> Value {
    json!({ "line": line, "column": 1 })
}

fn tag(name: &str, line: usize) -> Value {
    json!({ "id": format!("t{line}{name}"), "location": loc(line), "name": name })
}

fn row(id: &str, line: usize, values: &[&str]) -> Value {
    let cells: Vec<_> = values
        .iter()
        .map(|v| json!({ "location": loc(line), "value": v }))
        .collect();
    json!({ "id": id, "location": loc(line), "cells": cells })
}

fn examples(id: &str, tags: &[&str], header: &[&str], body: &[&[&str]]) -> Value {
    let tags: Vec<_> = tags.iter().map(|t| tag(t, 20)).collect();
    let body: Vec<_> = body
        .iter()
        .enumerate()
        .map(|(i, values)| row(&format!("{id}r{i}"), 22 + i, values))
        .collect();
    json!({
        "id": id, "location": loc(20), "tags": tags, "keyword": "Examples",
        "description": "", "tableHeader": row(&format!("{id}h"), 21, header),
        "tableBody": body
    })
}

fn outline(tags: &[&str], tables: Vec<Value>) -> Scenario {
    let tags: Vec<_> = tags.iter().map(|t| tag(t, 2)).collect();
    serde_json::from_value(json!({
        "id": "s", "location": loc(3), "tags": tags, "keyword": "Scenario Outline",
        "name": "eat <eat>", "description": "",
        "steps": [
            { "id": "1", "location": loc(4), "keyword": "Given", "keywordType": "Context",
              "text": "there are <start> cucumbers" },
            { "id": "3", "location": loc(5), "keyword": "When", "keywordType": "Action",
              "text": "I eat <eat> of <unknown>",
              "dataTable": { "location": loc(6), "rows": [row("2", 6, &["<eat>", "<left>"])] } },
            { "id": "4", "location": loc(7), "keyword": "Then", "keywordType": "Outcome",
              "text": "I should have <left> cucumbers" }
        ],
        "examples": tables
    }))
    .unwrap_or_else(|err| panic!("outline should deserialize: {err}"))
}

#[fixture]
fn cucumbers() -> Scenario {
    outline(
        &["@a"],
        vec![
            examples(
                "e1",
                &["@b"],
                &["start", "eat", "left"],
                &[&["12", "5", "7"], &["20", "5", "15"]],
            ),
            examples("e2", &["@c", "@a"], &["start", "eat", "left"], &[&["3", "1", "2"]]),
        ],
    )
}

#[rstest]
#[case("<x> and <y>", "1 and 2")]
#[case("<x><x>", "11")]
#[case("<z> stays", "<z> stays")]
#[case("< x> is not a placeholder", "< x> is not a placeholder")]
#[case("<y> is <x>", "2 is 1")]
fn substitutes_known_placeholders(#[case] text: &str, #[case] expected: &str) {
    let params = vec![
        ("x".to_owned(), "1".to_owned()),
        ("y".to_owned(), "2".to_owned()),
    ];
    assert_eq!(substitute_placeholders(text, &params), expected);
}

#[test]
fn substitution_is_single_pass() {
    let params = vec![
        ("a".to_owned(), "<b>".to_owned()),
        ("b".to_owned(), "boom".to_owned()),
    ];
    assert_eq!(substitute_placeholders("<a>", &params), "<b>");
}

#[rstest]
fn expands_every_row_in_order(cucumbers: Scenario) {
    let concrete = expand(&cucumbers);
    let rows: Vec<(usize, usize)> = concrete
        .iter()
        .filter_map(|c| c.example.as_ref().map(|e| (e.table_index, e.row_index)))
        .collect();
    assert_eq!(rows, vec![(0, 0), (0, 1), (1, 0)]);

    let Some(first) = concrete.first() else {
        panic!("first concrete scenario expected");
    };
    let texts: Vec<&str> = first.scenario.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "there are 12 cucumbers",
            "I eat 5 of <unknown>",
            "I should have 7 cucumbers",
        ]
    );
    assert!(first.scenario.examples.is_empty());
    assert_eq!(first.scenario.name, "eat <eat>");
    assert_eq!(first.example.as_ref().and_then(|e| e.get("left")), Some("7"));
}

#[rstest]
fn substitutes_data_table_cells(cucumbers: Scenario) {
    let concrete = expand(&cucumbers);
    let Some(second) = concrete.get(1) else {
        panic!("second concrete scenario expected");
    };
    let table = second
        .scenario
        .steps
        .get(1)
        .and_then(|s| s.data_table.as_ref())
        .map(crate::model::DataTable::raw);
    assert_eq!(table, Some(vec![vec!["5".to_owned(), "15".to_owned()]]));

    let template_table = cucumbers
        .steps
        .get(1)
        .and_then(|s| s.data_table.as_ref())
        .map(crate::model::DataTable::raw);
    assert_eq!(
        template_table,
        Some(vec![vec!["<eat>".to_owned(), "<left>".to_owned()]])
    );
}

#[rstest]
fn tags_union_only_the_expanded_table(cucumbers: Scenario) {
    let concrete = expand(&cucumbers);
    let labels: Vec<Vec<&str>> = concrete
        .iter()
        .map(|c| c.tag_labels().into_iter().collect())
        .collect();
    assert_eq!(labels, vec![vec!["a", "b"], vec!["a", "b"], vec!["a", "c"]]);

    let Some(last) = concrete.last() else {
        panic!("last concrete scenario expected");
    };
    let names: Vec<&str> = last.scenario.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["@a", "@c"]);
}

#[test]
fn plain_scenarios_expand_to_themselves() {
    let scenario = outline(&["@only"], Vec::new());
    let concrete = expand(&scenario);
    assert_eq!(concrete.len(), 1);
    let Some(only) = concrete.first() else {
        panic!("one concrete scenario expected");
    };
    assert_eq!(only.scenario, scenario);
    assert!(only.example.is_none());
}

#[rstest]
fn rendering_is_deterministic(cucumbers: Scenario) {
    let Some(table) = cucumbers.examples.first() else {
        panic!("examples expected");
    };
    let once = render(&cucumbers, table, 0, 1);
    let twice = render(&cucumbers, table, 0, 1);
    assert!(once.is_some());
    assert_eq!(once, twice);
    assert!(render(&cucumbers, table, 0, 9).is_none());
}

fn feature_with_rules() -> Feature {
    let step = |id: &str, text: &str| {
        json!({ "id": id, "location": loc(9), "keyword": "Given",
                "keywordType": "Context", "text": text })
    };
    let background = |id: &str, text: &str| {
        json!({ "background": { "id": id, "location": loc(2), "keyword": "Background",
                "name": "", "description": "", "steps": [step(&format!("{id}s"), text)] } })
    };
    let scenario = |id: &str, name: &str| {
        json!({ "scenario": { "id": id, "location": loc(5), "tags": [], "keyword": "Scenario",
                "name": name, "description": "", "steps": [step(&format!("{id}s"), name)] } })
    };
    let doc = json!({
        "feature": {
            "location": loc(1), "tags": [], "language": "en", "keyword": "Feature",
            "name": "Shop", "description": "",
            "children": [
                background("b0", "an open shop"),
                scenario("s1", "browse"),
                { "rule": { "id": "r1", "location": loc(10), "tags": [tag("@rule", 9)],
                    "keyword": "Rule", "name": "Checkout", "description": "",
                    "children": [background("b1", "a full basket"), scenario("s2", "pay")] } },
                { "rule": { "id": "r2", "location": loc(20), "tags": [],
                    "keyword": "Rule", "name": "Returns", "description": "",
                    "children": [scenario("s3", "refund")] } }
            ]
        }
    });
    GherkinDocument::from_json(doc)
        .unwrap_or_else(|err| panic!("feature should load: {err}"))
        .feature
}

#[test]
fn compiles_cases_with_nearest_background() {
    let cases = compile_feature(&feature_with_rules());
    let summary: Vec<(Option<&str>, &str, Option<&str>)> = cases
        .iter()
        .map(|case| {
            (
                case.rule_name.as_deref(),
                case.scenario.scenario.name.as_str(),
                case.background
                    .as_ref()
                    .and_then(|b| b.steps.first())
                    .map(|s| s.text.as_str()),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (None, "browse", Some("an open shop")),
            (Some("Checkout"), "pay", Some("a full basket")),
            (Some("Returns"), "refund", Some("an open shop")),
        ]
    );
    assert!(cases.iter().all(|case| case.feature_name == "Shop"));
}

#[test]
fn rule_tags_are_not_inherited() {
    let cases = compile_feature(&feature_with_rules());
    let Some(pay) = cases.get(1) else {
        panic!("rule scenario expected");
    };
    assert!(pay.scenario.tag_labels().is_empty());
}
