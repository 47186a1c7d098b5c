//! Data tables, rows, cells and doc strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::Location;

/// Raised when a data table is too small to be read as a header plus values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "data table at line {line} needs at least two rows: one for headers and one for values, \
     found {rows}"
)]
pub struct DataTableShapeError {
    /// Line of the table.
    pub line: usize,
    /// Number of rows the table has.
    pub rows: usize,
}

/// Escape a cell value to its canonical raw form.
///
/// Every lone backslash is doubled. Pairs that are already doubled are kept,
/// so applying the function twice gives the same result as applying it once.
///
/// # Examples
/// ```
/// use featureflow::model::to_raw_string;
///
/// assert_eq!(to_raw_string(r"a\b"), r"a\\b");
/// assert_eq!(to_raw_string(&to_raw_string(r"a\b")), r"a\\b");
/// ```
#[must_use]
pub fn to_raw_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push_str("\\\\");
            if chars.peek() == Some(&'\\') {
                chars.next();
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Longest prefix shared by `a` and `b`, on character boundaries.
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, left), right)| left == right)
        .last()
        .map_or(0, |((index, ch), _)| index + ch.len_utf8());
    a.get(..len).unwrap_or_default()
}

/// Strip the leading whitespace common to every non-blank line.
///
/// The margin is compared as text, so a tab and a space never count as the
/// same indentation. Lines holding only whitespace are ignored when finding
/// the margin and are emptied in the output.
///
/// # Examples
/// ```
/// use featureflow::model::dedent;
///
/// assert_eq!(dedent("    a\n      b"), "a\n  b");
/// assert_eq!(dedent("\ta\n    b"), "\ta\n    b");
/// ```
#[must_use]
pub fn dedent(text: &str) -> String {
    let margin = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.strip_suffix(line.trim_start()).unwrap_or_default())
        .reduce(common_prefix)
        .unwrap_or_default();
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line.strip_prefix(margin).unwrap_or(line));
    }
    out
}

fn raw_cell_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|value| to_raw_string(&value))
}

fn dedented<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|value| dedent(&value))
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Location of the cell content.
    pub location: Location,
    /// Cell value in canonical raw form.
    #[serde(deserialize_with = "raw_cell_value")]
    pub value: String,
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Node identifier.
    pub id: String,
    /// Location of the leading `|`.
    pub location: Location,
    /// Cells in column order.
    pub cells: Vec<Cell>,
}

impl Row {
    /// Cell values in column order.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.cells.iter().map(|cell| cell.value.clone()).collect()
    }
}

/// A data table attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    /// Location of the first row.
    pub location: Location,
    /// Rows in source order.
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl DataTable {
    /// Return a new table with rows and columns swapped.
    ///
    /// Transposed rows are numbered `"0"`, `"1"`, ... and located at the
    /// table. Ragged tables are cut to the shortest row.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let width = self
            .rows
            .iter()
            .map(|row| row.cells.len())
            .min()
            .unwrap_or(0);
        let rows = (0..width)
            .map(|column| Row {
                id: column.to_string(),
                location: self.location,
                cells: self
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(column).cloned())
                    .collect(),
            })
            .collect();
        Self {
            location: self.location,
            rows,
        }
    }

    /// Map each header value to the values below it.
    ///
    /// # Errors
    /// Returns [`DataTableShapeError`] when the table has fewer than two rows.
    pub fn to_dict(&self) -> Result<BTreeMap<String, Vec<String>>, DataTableShapeError> {
        let (Some(header), Some(_)) = (self.rows.first(), self.rows.get(1)) else {
            return Err(DataTableShapeError {
                line: self.location.line,
                rows: self.rows.len(),
            });
        };
        let body = self.rows.get(1..).unwrap_or_default();
        Ok(header
            .cells
            .iter()
            .enumerate()
            .map(|(column, key)| {
                let values = body
                    .iter()
                    .filter_map(|row| row.cells.get(column))
                    .map(|cell| cell.value.clone())
                    .collect();
                (key.value.clone(), values)
            })
            .collect())
    }

    /// Cell values as nested vectors.
    #[must_use]
    pub fn raw(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(Row::values).collect()
    }
}

/// A doc string attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocString {
    /// Location of the opening delimiter.
    pub location: Location,
    /// Content with the common indentation removed.
    #[serde(deserialize_with = "dedented")]
    pub content: String,
    /// `"""` or `` ``` ``.
    pub delimiter: String,
    /// Media type written after the opening delimiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}
