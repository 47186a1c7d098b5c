//! Line-level scan of feature-file text.
//!
//! The `gherkin` crate reports node positions but drops comments, doc string
//! delimiters, row and cell positions and tag positions. The scan recovers
//! them from the text so the document tree can carry exact locations.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Location;

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*language\s*:\s*([A-Za-z0-9_-]+)\s*$")
        .unwrap_or_else(|_| unreachable!("language directive regex is valid"))
});

const DELIMITERS: [&str; 2] = ["\"\"\"", "```"];

/// Coarse kind of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    Comment,
    Tag,
    Row,
    DocString,
    Other,
}

/// A 1-based view of the lines of a feature file.
#[derive(Debug)]
pub(crate) struct SourceScan<'a> {
    lines: Vec<&'a str>,
    kinds: Vec<LineKind>,
}

fn opening_delimiter(trimmed: &str) -> Option<&'static str> {
    DELIMITERS
        .into_iter()
        .find(|delimiter| trimmed.starts_with(delimiter))
}

fn classify_lines(lines: &[&str]) -> Vec<LineKind> {
    let mut open: Option<&str> = None;
    lines
        .iter()
        .map(|line| {
            let trimmed = line.trim_start();
            if let Some(delimiter) = open {
                if trimmed.starts_with(delimiter) {
                    open = None;
                }
                return LineKind::DocString;
            }
            if let Some(delimiter) = opening_delimiter(trimmed) {
                open = Some(delimiter);
                LineKind::DocString
            } else if trimmed.is_empty() {
                LineKind::Blank
            } else if trimmed.starts_with('#') {
                LineKind::Comment
            } else if trimmed.starts_with('@') {
                LineKind::Tag
            } else if trimmed.starts_with('|') {
                LineKind::Row
            } else {
                LineKind::Other
            }
        })
        .collect()
}

/// A table cell whose closing `|` has not been reached yet.
#[derive(Debug)]
struct OpenCell {
    start: usize,
    content: Option<usize>,
    value: String,
    end: usize,
}

impl OpenCell {
    const fn new(start: usize) -> Self {
        Self {
            start,
            content: None,
            value: String::new(),
            end: 0,
        }
    }

    /// Escaped characters are content even when they are whitespace.
    fn push(&mut self, column: usize, ch: char, escaped: bool) {
        if escaped || !ch.is_whitespace() {
            self.content.get_or_insert(column);
            self.value.push(ch);
            self.end = self.value.len();
        } else if self.content.is_some() {
            self.value.push(ch);
        }
    }

    fn close(mut self) -> (usize, String) {
        self.value.truncate(self.end);
        (self.content.unwrap_or(self.start), self.value)
    }
}

/// 1-based column of the first non-whitespace character.
fn indent_column(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count() + 1
}

impl<'a> SourceScan<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let lines: Vec<&str> = source
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let kinds = classify_lines(&lines);
        Self { lines, kinds }
    }

    /// The text of 1-based `line`.
    pub(crate) fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .copied()
    }

    pub(crate) fn kind(&self, line: usize) -> Option<LineKind> {
        line.checked_sub(1)
            .and_then(|index| self.kinds.get(index))
            .copied()
    }

    pub(crate) fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Location of the first non-whitespace character of `line`.
    pub(crate) fn start_of(&self, line: usize) -> Location {
        Location::new(line, self.line(line).map_or(1, indent_column))
    }

    /// The `# language:` directive in the file header, with its line.
    pub(crate) fn language(&self) -> Option<(usize, &'a str)> {
        for (index, kind) in self.kinds.iter().enumerate() {
            match kind {
                LineKind::Blank => {}
                LineKind::Comment => {
                    let text: &'a str = self.lines.get(index).copied()?;
                    if let Some(caps) = LANGUAGE_RE.captures(text) {
                        return caps.get(1).map(|m| (index + 1, m.as_str()));
                    }
                }
                _ => return None,
            }
        }
        None
    }

    /// Comment lines outside doc strings, excluding the language directive.
    pub(crate) fn comments(&self) -> Vec<(Location, &'a str)> {
        let directive = self.language().map(|(line, _)| line);
        self.kinds
            .iter()
            .zip(&self.lines)
            .enumerate()
            .filter(|(index, (kind, _))| {
                **kind == LineKind::Comment && Some(index + 1) != directive
            })
            .map(|(index, (_, text))| (self.start_of(index + 1), *text))
            .collect()
    }

    /// First line at or after `line` that holds a `keyword:` header.
    ///
    /// Node positions may point at the tags above a node, so tag, comment
    /// and blank lines are skipped.
    pub(crate) fn header_line(&self, line: usize) -> usize {
        (line..=self.line_count())
            .find(|&candidate| self.kind(candidate) == Some(LineKind::Other))
            .unwrap_or(line)
    }

    /// Last line at or before `line` that is neither blank nor a comment.
    pub(crate) fn content_line_at_or_before(&self, line: usize) -> Option<usize> {
        (1..=line.min(self.line_count()))
            .rev()
            .find(|&candidate| {
                !matches!(
                    self.kind(candidate),
                    Some(LineKind::Blank | LineKind::Comment) | None
                )
            })
    }

    /// Keyword and name of the header at `line`.
    pub(crate) fn header(&self, line: usize) -> (String, String) {
        let text = self.line(line).unwrap_or_default().trim();
        match text.split_once(':') {
            Some((keyword, name)) => (keyword.trim().to_owned(), name.trim().to_owned()),
            None => (text.to_owned(), String::new()),
        }
    }

    /// Free text following the header at `line`.
    ///
    /// Collection stops at the first structural line: any line listed in
    /// `structural`, a tag, a row or a doc string. Comments are skipped.
    pub(crate) fn description(&self, line: usize, structural: &[usize]) -> String {
        let mut collected: Vec<&str> = Vec::new();
        for candidate in line + 1..=self.line_count() {
            if structural.binary_search(&candidate).is_ok() {
                break;
            }
            match self.kind(candidate) {
                Some(LineKind::Comment) => {}
                Some(LineKind::Blank) if collected.is_empty() => {}
                Some(LineKind::Blank | LineKind::Other) => {
                    collected.push(self.line(candidate).unwrap_or_default().trim_end());
                }
                _ => break,
            }
        }
        while collected.last().is_some_and(|text| text.is_empty()) {
            collected.pop();
        }
        collected.join("\n")
    }

    /// Whether `line` is a table row.
    pub(crate) fn is_row(&self, line: usize) -> bool {
        self.kind(line) == Some(LineKind::Row)
    }

    /// Table row lines directly following `line`.
    pub(crate) fn rows_after(&self, line: usize) -> Vec<usize> {
        let mut rows = Vec::new();
        for candidate in line + 1..=self.line_count() {
            match self.kind(candidate) {
                Some(LineKind::Row) => rows.push(candidate),
                Some(LineKind::Blank | LineKind::Comment) => {}
                _ => break,
            }
        }
        rows
    }

    /// Opening delimiter location, delimiter and media type of the doc string
    /// following `line`.
    pub(crate) fn doc_string_after(
        &self,
        line: usize,
    ) -> Option<(Location, String, Option<String>)> {
        for candidate in line + 1..=self.line_count() {
            match self.kind(candidate) {
                Some(LineKind::DocString) => {
                    let trimmed = self.line(candidate)?.trim();
                    let delimiter = opening_delimiter(trimmed)?;
                    let media_type = trimmed
                        .strip_prefix(delimiter)
                        .map(str::trim)
                        .filter(|media| !media.is_empty())
                        .map(str::to_owned);
                    return Some((self.start_of(candidate), delimiter.to_owned(), media_type));
                }
                Some(LineKind::Blank | LineKind::Comment | LineKind::Row) => {}
                _ => return None,
            }
        }
        None
    }

    /// Column and unescaped value of each cell of the row at `line`.
    ///
    /// A cell is located at its first non-blank character, or just after its
    /// opening `|` when empty. `\|`, `\\` and `\n` are unescaped; any other
    /// backslash is kept. Text after the last `|` is ignored.
    pub(crate) fn cells(&self, line: usize) -> Vec<(usize, String)> {
        let Some(text) = self.line(line) else {
            return Vec::new();
        };
        let mut cells = Vec::new();
        let mut open: Option<OpenCell> = None;
        let mut chars = text.chars().enumerate().peekable();
        while let Some((index, ch)) = chars.next() {
            let column = index + 1;
            if ch == '|' {
                if let Some(cell) = open.take() {
                    cells.push(cell.close());
                }
                open = Some(OpenCell::new(column + 1));
                continue;
            }
            let Some(cell) = open.as_mut() else {
                continue;
            };
            if ch != '\\' {
                cell.push(column, ch, false);
                continue;
            }
            let unescaped = match chars.peek().map(|&(_, next)| next) {
                Some('|') => Some('|'),
                Some('\\') => Some('\\'),
                Some('n') => Some('\n'),
                _ => None,
            };
            if unescaped.is_some() {
                chars.next();
            }
            cell.push(column, unescaped.unwrap_or('\\'), true);
        }
        cells
    }

    /// Tags written above the node whose header is at `line`, top to bottom.
    pub(crate) fn tags_before(&self, line: usize) -> Vec<(Location, String)> {
        let mut tag_lines = Vec::new();
        let mut candidate = line;
        while candidate > 1 {
            candidate -= 1;
            match self.kind(candidate) {
                Some(LineKind::Tag) => tag_lines.push(candidate),
                Some(LineKind::Blank | LineKind::Comment) => {}
                _ => break,
            }
        }
        tag_lines.reverse();
        tag_lines
            .into_iter()
            .flat_map(|tag_line| self.tags_on(tag_line))
            .collect()
    }

    fn tags_on(&self, line: usize) -> Vec<(Location, String)> {
        let text = self.line(line).unwrap_or_default();
        let mut tags = Vec::new();
        let mut current: Option<(usize, String)> = None;
        for (index, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                if let Some((column, name)) = current.take() {
                    tags.push((Location::new(line, column), name));
                }
                continue;
            }
            match current.as_mut() {
                Some((_, name)) => name.push(ch),
                None if ch == '@' => current = Some((index + 1, String::from(ch))),
                // A trailing comment ends the tag line.
                None if ch == '#' => break,
                None => current = Some((index + 1, String::from(ch))),
            }
        }
        if let Some((column, name)) = current {
            tags.push((Location::new(line, column), name));
        }
        tags
    }
}
