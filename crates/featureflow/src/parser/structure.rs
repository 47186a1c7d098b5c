//! Block-structure check for English feature files.
//!
//! The `gherkin` crate reports the furthest position its parser reached,
//! which is usually a step well after the real mistake. When it rejects a
//! file, the lines are replayed through the Gherkin block grammar to find the
//! first line that cannot appear where it does.

use super::engine::EngineFailure;
use super::scan::{LineKind, SourceScan};

const STEP_KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];

const HEADERS: [(&str, Token); 11] = [
    ("Feature", Token::Feature),
    ("Business Need", Token::Feature),
    ("Ability", Token::Feature),
    ("Background", Token::Background),
    ("Rule", Token::Rule),
    ("Scenario", Token::Scenario),
    ("Example", Token::Scenario),
    ("Scenario Outline", Token::Scenario),
    ("Scenario Template", Token::Scenario),
    ("Examples", Token::Examples),
    ("Scenarios", Token::Examples),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Feature,
    Background,
    Rule,
    Scenario,
    Examples,
    Step,
    Row,
    DocString,
    Tag,
    Text,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Start,
    Feature,
    Rule,
    Background,
    Scenario,
    Examples,
}

fn is_step(trimmed: &str) -> bool {
    STEP_KEYWORDS.iter().any(|keyword| {
        trimmed
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

fn token(kind: LineKind, text: &str) -> Option<Token> {
    match kind {
        LineKind::Blank | LineKind::Comment => None,
        LineKind::Tag => Some(Token::Tag),
        LineKind::Row => Some(Token::Row),
        LineKind::DocString => Some(Token::DocString),
        LineKind::Other => {
            let trimmed = text.trim();
            if is_step(trimmed) {
                return Some(Token::Step);
            }
            let header = trimmed.split_once(':').and_then(|(keyword, _)| {
                HEADERS
                    .iter()
                    .find(|(name, _)| *name == keyword.trim_end())
                    .map(|(_, token)| *token)
            });
            Some(header.unwrap_or(Token::Text))
        }
    }
}

/// Position in the block grammar.
#[derive(Debug)]
struct Walker {
    block: Block,
    describing: bool,
    after_step: bool,
    tagged: bool,
}

impl Walker {
    const fn new() -> Self {
        Self {
            block: Block::Start,
            describing: false,
            after_step: false,
            tagged: false,
        }
    }

    fn enter(&mut self, block: Block) {
        self.block = block;
        self.describing = true;
        self.after_step = false;
        self.tagged = false;
    }

    /// Advance over `token`, or report what was expected instead.
    fn accept(&mut self, token: Token) -> Result<(), &'static str> {
        if self.tagged && !matches!(token, Token::Tag) {
            let allowed = match self.block {
                Block::Start => token == Token::Feature,
                Block::Scenario | Block::Examples => {
                    matches!(token, Token::Scenario | Token::Rule | Token::Examples)
                }
                _ => matches!(token, Token::Scenario | Token::Rule),
            };
            if !allowed {
                return Err(self.expected());
            }
        }
        let next = match (token, self.block) {
            (Token::Eof, _) => None,
            (Token::Tag, _) => {
                self.tagged = true;
                self.describing = false;
                self.after_step = false;
                return Ok(());
            }
            (Token::Feature, Block::Start) => Some(Block::Feature),
            (Token::Background, Block::Feature | Block::Rule) => Some(Block::Background),
            (Token::Scenario, block) if block != Block::Start => Some(Block::Scenario),
            (Token::Rule, block) if block != Block::Start => Some(Block::Rule),
            (Token::Examples, Block::Scenario | Block::Examples) => Some(Block::Examples),
            (Token::Step, Block::Background | Block::Scenario) => {
                self.describing = false;
                self.after_step = true;
                return Ok(());
            }
            (Token::Row, Block::Examples) => {
                self.describing = false;
                return Ok(());
            }
            (Token::Row, _) if self.after_step => return Ok(()),
            (Token::DocString, _) if self.after_step => {
                self.after_step = false;
                return Ok(());
            }
            (Token::Text, _) if self.describing => return Ok(()),
            _ => return Err(self.expected()),
        };
        if let Some(block) = next {
            self.enter(block);
        }
        Ok(())
    }

    fn expected(&self) -> &'static str {
        if self.tagged {
            return match self.block {
                Block::Start => "#TagLine, #FeatureLine, #Comment, #Empty",
                Block::Scenario | Block::Examples => {
                    "#TagLine, #ExamplesLine, #ScenarioLine, #RuleLine, #Comment, #Empty"
                }
                _ => "#TagLine, #ScenarioLine, #RuleLine, #Comment, #Empty",
            };
        }
        match (self.block, self.after_step) {
            (Block::Start, _) => "#EOF, #Language, #TagLine, #FeatureLine, #Comment, #Empty",
            (Block::Feature | Block::Rule, _) => {
                "#EOF, #Empty, #Comment, #BackgroundLine, #TagLine, #ScenarioLine, #RuleLine, #Other"
            }
            (Block::Background, true) => {
                "#EOF, #TableRow, #DocStringSeparator, #StepLine, #TagLine, #ScenarioLine, #RuleLine, #Comment, #Empty"
            }
            (Block::Background, false) => {
                "#EOF, #Empty, #Comment, #StepLine, #TagLine, #ScenarioLine, #RuleLine, #Other"
            }
            (Block::Scenario, true) => {
                "#EOF, #TableRow, #DocStringSeparator, #StepLine, #TagLine, #ExamplesLine, #ScenarioLine, #RuleLine, #Comment, #Empty"
            }
            (Block::Scenario, false) => {
                "#EOF, #Empty, #Comment, #StepLine, #TagLine, #ExamplesLine, #ScenarioLine, #RuleLine, #Other"
            }
            (Block::Examples, _) => {
                "#EOF, #Empty, #Comment, #TableRow, #TagLine, #ExamplesLine, #ScenarioLine, #RuleLine, #Other"
            }
        }
    }
}

/// The first line that breaks the block structure, as an engine failure.
///
/// Returns `None` when the structure is sound, in which case the engine's own
/// diagnostic is the better report.
pub(crate) fn first_violation(scan: &SourceScan<'_>) -> Option<EngineFailure> {
    let mut walker = Walker::new();
    let mut previous = None;
    for line in 1..=scan.line_count() {
        let kind = scan.kind(line)?;
        let continues_doc_string =
            kind == LineKind::DocString && previous == Some(LineKind::DocString);
        previous = Some(kind);
        if continues_doc_string {
            continue;
        }
        let text = scan.line(line)?;
        let Some(token) = token(kind, text) else {
            continue;
        };
        if let Err(expected) = walker.accept(token) {
            let location = scan.start_of(line);
            return Some(EngineFailure::at(
                location,
                format!(
                    "({}:{}): expected: {expected}, got '{}'",
                    location.line,
                    location.column,
                    text.trim()
                ),
            ));
        }
    }
    let end = scan.line_count() + 1;
    walker.accept(Token::Eof).err().map(|expected| {
        EngineFailure::at(
            scan.start_of(end),
            format!("({end}:1): expected: {expected}, got ''"),
        )
    })
}
