//! Default grammar engine backed by the `gherkin` crate.
//!
//! The crate's tree is re-emitted in the Gherkin JSON shape. Identifiers are
//! assigned in completion order: table rows before their step, steps and
//! Examples before their scenario, tags right before the node they decorate.

use std::sync::LazyLock;

use gherkin::{GherkinEnv, StepType};
use log::debug;
use regex::Regex;
use serde_json::{Value, json};

use super::engine::{EngineFailure, GrammarEngine};
use super::scan::SourceScan;
use super::structure::first_violation;
use crate::model::Location;

static POSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+):(\d+)").unwrap_or_else(|_| unreachable!("position regex is valid"))
});

static EXPECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"expected:?\s*(.*)").unwrap_or_else(|_| unreachable!("expected regex is valid"))
});

/// Grammar engine using the `gherkin` crate's parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct GherkinEngine;

impl GrammarEngine for GherkinEngine {
    fn parse(&self, source: &str, language: &str) -> Result<Value, EngineFailure> {
        let mut text = source.to_owned();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let scan = SourceScan::new(&text);
        let (directive_line, language) = scan.language().unwrap_or((1, language));
        let env = GherkinEnv::new(language).map_err(|err| {
            EngineFailure::at(
                Location::new(directive_line, 1),
                format!("unsupported language {language:?}: {err:?}"),
            )
        })?;
        let feature = gherkin::Feature::parse(text.as_str(), env)
            .map_err(|err| locate_failure(&scan, language, &err.to_string()))?;
        Ok(DocumentBuilder::new(&scan, &feature).document(&feature, language))
    }
}

/// Point a rejection at the line that caused it.
///
/// English files are checked against the block structure first. Other
/// dialects, and files whose structure is sound, keep the crate's position.
fn locate_failure(scan: &SourceScan<'_>, language: &str, raw: &str) -> EngineFailure {
    debug!("gherkin rejected the source: {raw}");
    let structural = if language == "en" {
        first_violation(scan)
    } else {
        None
    };
    structural.unwrap_or_else(|| normalise_failure(scan, raw))
}

/// Rewrite a crate diagnostic as `(line:col): expected: ..., got '<line>'`.
///
/// Positions past the end of the text or on blank and comment lines move
/// back to the nearest line with content.
fn normalise_failure(scan: &SourceScan<'_>, raw: &str) -> EngineFailure {
    let position = POSITION_RE.captures(raw).and_then(|caps| {
        let line = caps.get(1)?.as_str().parse::<usize>().ok()?;
        let column = caps.get(2)?.as_str().parse::<usize>().ok()?;
        Some(Location::new(line, column))
    });
    let Some(reported) = position else {
        return EngineFailure {
            message: raw.to_owned(),
            locations: Vec::new(),
        };
    };
    let location = scan
        .content_line_at_or_before(reported.line)
        .filter(|&line| line != reported.line)
        .map_or(reported, |line| scan.start_of(line));
    let expected = EXPECTED_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str())
        .trim();
    let got = scan.line(location.line).unwrap_or_default().trim();
    EngineFailure::at(
        location,
        format!(
            "({}:{}): expected: {expected}, got '{got}'",
            location.line, location.column
        ),
    )
}

fn primary_keyword_type(ty: StepType) -> &'static str {
    match ty {
        StepType::Given => "Context",
        StepType::When => "Action",
        StepType::Then => "Outcome",
    }
}

/// Tracks the keywords seen in one step block to spot conjunctions in
/// dialects other than English.
#[derive(Default)]
struct StepBlock {
    previous: Option<StepType>,
    introduced_by: Vec<(StepType, String)>,
}

impl StepBlock {
    fn keyword_type(&mut self, keyword: &str, ty: StepType) -> &'static str {
        let continues = self.previous == Some(ty);
        self.previous = Some(ty);
        match keyword {
            "*" | "And" | "But" => return "Conjunction",
            "Given" | "When" | "Then" => {}
            other => {
                let known = self
                    .introduced_by
                    .iter()
                    .find(|(seen, _)| *seen == ty)
                    .map(|(_, word)| word.as_str());
                if continues && known.is_some_and(|word| word != other) {
                    return "Conjunction";
                }
            }
        }
        self.introduced_by.retain(|(seen, _)| *seen != ty);
        self.introduced_by.push((ty, keyword.to_owned()));
        primary_keyword_type(ty)
    }
}

enum FeatureNode<'f> {
    Background(&'f gherkin::Background),
    Scenario(&'f gherkin::Scenario),
    Rule(&'f gherkin::Rule),
}

struct DocumentBuilder<'s, 'a> {
    scan: &'s SourceScan<'a>,
    next_id: usize,
    structural: Vec<usize>,
}

fn push_background(
    scan: &SourceScan<'_>,
    lines: &mut Vec<usize>,
    background: Option<&gherkin::Background>,
) {
    if let Some(background) = background {
        lines.push(scan.header_line(background.position.line));
        lines.extend(background.steps.iter().map(|step| step.position.line));
    }
}

fn push_scenarios(scan: &SourceScan<'_>, lines: &mut Vec<usize>, scenarios: &[gherkin::Scenario]) {
    for scenario in scenarios {
        lines.push(scan.header_line(scenario.position.line));
        lines.extend(scenario.steps.iter().map(|step| step.position.line));
        lines.extend(
            scenario
                .examples
                .iter()
                .map(|examples| scan.header_line(examples.position.line)),
        );
    }
}

/// Lines holding a node header or a step, sorted.
fn structural_lines(scan: &SourceScan<'_>, feature: &gherkin::Feature) -> Vec<usize> {
    let mut lines = vec![scan.header_line(feature.position.line)];
    push_background(scan, &mut lines, feature.background.as_ref());
    push_scenarios(scan, &mut lines, &feature.scenarios);
    for rule in &feature.rules {
        lines.push(scan.header_line(rule.position.line));
        push_background(scan, &mut lines, rule.background.as_ref());
        push_scenarios(scan, &mut lines, &rule.scenarios);
    }
    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Drop the line breaks that surround the doc string content.
fn doc_string_body(content: &str) -> &str {
    let body = content.strip_prefix('\n').unwrap_or(content);
    match body.rsplit_once('\n') {
        Some((head, tail)) if tail.trim().is_empty() => head,
        _ => body,
    }
}

fn location_json(location: Location) -> Value {
    json!({ "line": location.line, "column": location.column })
}

impl<'s, 'a> DocumentBuilder<'s, 'a> {
    fn new(scan: &'s SourceScan<'a>, feature: &gherkin::Feature) -> Self {
        Self {
            scan,
            next_id: 0,
            structural: structural_lines(scan, feature),
        }
    }

    fn id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }

    fn header(&self, position_line: usize) -> (usize, String, String, String) {
        let line = self.scan.header_line(position_line);
        let (keyword, name) = self.scan.header(line);
        let description = self.scan.description(line, &self.structural);
        (line, keyword, name, description)
    }

    fn document(mut self, feature: &gherkin::Feature, language: &str) -> Value {
        let (line, keyword, name, description) = self.header(feature.position.line);

        let mut nodes: Vec<(usize, FeatureNode<'_>)> = Vec::new();
        if let Some(background) = &feature.background {
            nodes.push((background.position.line, FeatureNode::Background(background)));
        }
        nodes.extend(
            feature
                .scenarios
                .iter()
                .map(|s| (s.position.line, FeatureNode::Scenario(s))),
        );
        nodes.extend(
            feature
                .rules
                .iter()
                .map(|r| (r.position.line, FeatureNode::Rule(r))),
        );
        nodes.sort_by_key(|(line, _)| *line);

        let children: Vec<Value> = nodes
            .into_iter()
            .map(|(_, node)| match node {
                FeatureNode::Background(background) => {
                    json!({ "background": self.background(background) })
                }
                FeatureNode::Scenario(scenario) => json!({ "scenario": self.scenario(scenario) }),
                FeatureNode::Rule(rule) => json!({ "rule": self.rule(rule) }),
            })
            .collect();
        let tags = self.tags(line, &feature.tags);
        let comments: Vec<Value> = self
            .scan
            .comments()
            .into_iter()
            .map(|(location, text)| json!({ "location": location_json(location), "text": text }))
            .collect();

        json!({
            "feature": {
                "location": location_json(self.scan.start_of(line)),
                "tags": tags,
                "language": language,
                "keyword": keyword,
                "name": name,
                "description": description,
                "children": children,
            },
            "comments": comments,
        })
    }

    fn rule(&mut self, rule: &gherkin::Rule) -> Value {
        let (line, keyword, name, description) = self.header(rule.position.line);
        let mut children = Vec::new();
        let mut scenarios = rule.scenarios.iter().peekable();
        if let Some(background) = &rule.background {
            while let Some(scenario) =
                scenarios.next_if(|s| s.position.line < background.position.line)
            {
                children.push(json!({ "scenario": self.scenario(scenario) }));
            }
            children.push(json!({ "background": self.background(background) }));
        }
        for scenario in scenarios {
            children.push(json!({ "scenario": self.scenario(scenario) }));
        }
        let tags = self.tags(line, &rule.tags);
        json!({
            "id": self.id(),
            "location": location_json(self.scan.start_of(line)),
            "tags": tags,
            "keyword": keyword,
            "name": name,
            "description": description,
            "children": children,
        })
    }

    fn background(&mut self, background: &gherkin::Background) -> Value {
        let (line, keyword, name, description) = self.header(background.position.line);
        let steps = self.steps(&background.steps);
        json!({
            "id": self.id(),
            "location": location_json(self.scan.start_of(line)),
            "keyword": keyword,
            "name": name,
            "description": description,
            "steps": steps,
        })
    }

    fn scenario(&mut self, scenario: &gherkin::Scenario) -> Value {
        let (line, keyword, name, description) = self.header(scenario.position.line);
        let steps = self.steps(&scenario.steps);
        let examples: Vec<Value> = scenario
            .examples
            .iter()
            .map(|examples| self.examples(examples))
            .collect();
        let tags = self.tags(line, &scenario.tags);
        json!({
            "id": self.id(),
            "location": location_json(self.scan.start_of(line)),
            "tags": tags,
            "keyword": keyword,
            "name": name,
            "description": description,
            "steps": steps,
            "examples": examples,
        })
    }

    fn examples(&mut self, examples: &gherkin::Examples) -> Value {
        let (line, keyword, name, description) = self.header(examples.position.line);
        let first_row = (line + 1..)
            .take_while(|candidate| {
                self.scan.line(*candidate).is_some()
                    && self.structural.binary_search(candidate).is_err()
            })
            .find(|candidate| self.scan.is_row(*candidate));
        let row_lines = first_row
            .map(|row| {
                let mut lines = vec![row];
                lines.extend(self.scan.rows_after(row));
                lines
            })
            .unwrap_or_default();

        let rows = examples
            .table
            .as_ref()
            .map(|table| table.rows.as_slice())
            .unwrap_or_default();
        let fallback = Location::new(line + 1, 1);
        let mut built: Vec<Value> = rows
            .iter()
            .enumerate()
            .map(|(index, cells)| self.row(row_lines.get(index).copied(), fallback, cells))
            .collect();
        let header = (!built.is_empty()).then(|| built.remove(0));
        let tags = self.tags(line, &examples.tags);

        let mut node = json!({
            "id": self.id(),
            "location": location_json(self.scan.start_of(line)),
            "tags": tags,
            "keyword": keyword,
            "description": description,
            "tableBody": built,
        });
        if let Some(object) = node.as_object_mut() {
            if !name.is_empty() {
                object.insert("name".to_owned(), Value::String(name));
            }
            if let Some(header) = header {
                object.insert("tableHeader".to_owned(), header);
            }
        }
        node
    }

    fn steps(&mut self, steps: &[gherkin::Step]) -> Vec<Value> {
        let mut block = StepBlock::default();
        steps.iter().map(|step| self.step(step, &mut block)).collect()
    }

    fn step(&mut self, step: &gherkin::Step, block: &mut StepBlock) -> Value {
        let line = step.position.line;
        let keyword = step.keyword.trim();
        let keyword_type = block.keyword_type(keyword, step.ty);

        let data_table = step.table.as_ref().map(|table| {
            let row_lines = self.scan.rows_after(line);
            let fallback = Location::new(line + 1, 1);
            let rows: Vec<Value> = table
                .rows
                .iter()
                .enumerate()
                .map(|(index, cells)| self.row(row_lines.get(index).copied(), fallback, cells))
                .collect();
            let first = row_lines.first().map_or(fallback, |l| self.scan.start_of(*l));
            json!({ "location": location_json(first), "rows": rows })
        });
        let doc_string = step.docstring.as_ref().map(|content| {
            let (location, delimiter, media_type) = self
                .scan
                .doc_string_after(line)
                .unwrap_or_else(|| (Location::new(line + 1, 1), "\"\"\"".to_owned(), None));
            let mut node = json!({
                "location": location_json(location),
                "content": doc_string_body(content),
                "delimiter": delimiter,
            });
            if let (Some(media_type), Some(object)) = (media_type, node.as_object_mut()) {
                object.insert("mediaType".to_owned(), Value::String(media_type));
            }
            node
        });

        let mut node = json!({
            "id": self.id(),
            "location": location_json(self.scan.start_of(line)),
            "keyword": keyword,
            "keywordType": keyword_type,
            "text": step.value.trim_end(),
        });
        if let Some(object) = node.as_object_mut() {
            if let Some(data_table) = data_table {
                object.insert("dataTable".to_owned(), data_table);
            }
            if let Some(doc_string) = doc_string {
                object.insert("docString".to_owned(), doc_string);
            }
        }
        node
    }

    /// Cells are re-read from the source line, which honours the `\|`,
    /// `\\` and `\n` escapes the crate ignores.
    fn row(&mut self, line: Option<usize>, fallback: Location, cells: &[String]) -> Value {
        let location = line.map_or(fallback, |l| self.scan.start_of(l));
        let scanned = line.map(|l| self.scan.cells(l)).unwrap_or_default();
        let cells = if scanned.is_empty() {
            cells
                .iter()
                .map(|value| (location.column, value.clone()))
                .collect()
        } else {
            scanned
        };
        let cells: Vec<Value> = cells
            .into_iter()
            .map(|(column, value)| {
                json!({
                    "location": location_json(Location::new(location.line, column)),
                    "value": value,
                })
            })
            .collect();
        json!({
            "id": self.id(),
            "location": location_json(location),
            "cells": cells,
        })
    }

    fn tags(&mut self, header_line: usize, names: &[String]) -> Vec<Value> {
        let mut scanned = self.scan.tags_before(header_line);
        names
            .iter()
            .map(|raw| {
                let name = if raw.starts_with('@') {
                    raw.clone()
                } else {
                    format!("@{raw}")
                };
                let location = scanned
                    .iter()
                    .position(|(_, seen)| *seen == name)
                    .map(|index| scanned.remove(index).0)
                    .unwrap_or_else(|| Location::new(header_line.saturating_sub(1).max(1), 1));
                json!({
                    "id": self.id(),
                    "location": location_json(location),
                    "name": name,
                })
            })
            .collect()
    }
}
