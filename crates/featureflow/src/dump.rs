//! Capture of values printed by a test process.
//!
//! A test that runs steps in a child process can print values with
//! [`dump_objects`] and read them back from the captured output with
//! [`collect_dumped_objects`]. Each value is written as single-line JSON
//! between [`DUMP_START`] and [`DUMP_END`].

use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Marker written before each dumped value.
pub const DUMP_START: &str = "_featureflow_>>>";
/// Marker written after each dumped value.
pub const DUMP_END: &str = "<<<_featureflow_";

static DUMPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}(.*?){}",
        regex::escape(DUMP_START),
        regex::escape(DUMP_END)
    ))
    .unwrap_or_else(|_| unreachable!("dump markers escape to a valid regex"))
});

/// Failure to write or read dumped values.
#[derive(Debug, Error)]
pub enum DumpError {
    /// A value could not be serialised or a payload could not be decoded.
    #[error("invalid dump payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The output could not be written.
    #[error("failed to write dump: {0}")]
    Io(#[from] io::Error),
}

/// Write each value to standard output, one line per value.
///
/// # Errors
/// See [`dump_objects_to`].
pub fn dump_objects<T: Serialize>(objects: &[T]) -> Result<(), DumpError> {
    dump_objects_to(&mut io::stdout().lock(), objects)
}

/// Write each value to `out`, one line per value.
///
/// # Errors
/// Returns [`DumpError::Json`] when a value cannot be serialised and
/// [`DumpError::Io`] when writing fails.
///
/// # Examples
/// ```
/// use featureflow::dump::{collect_dumped_objects, dump_objects_to};
///
/// let mut out = Vec::new();
/// dump_objects_to(&mut out, &[("apples", 3), ("pears", 2)]).expect("writes to a vec");
/// let text = String::from_utf8(out).expect("dump is utf-8");
/// let back: Vec<(String, u32)> = collect_dumped_objects(&text).expect("payloads decode");
/// assert_eq!(back, vec![("apples".to_owned(), 3), ("pears".to_owned(), 2)]);
/// ```
pub fn dump_objects_to<W: Write, T: Serialize>(out: &mut W, objects: &[T]) -> Result<(), DumpError> {
    for object in objects {
        let payload = serde_json::to_string(object)?;
        writeln!(out, "{DUMP_START}{payload}{DUMP_END}")?;
    }
    out.flush()?;
    Ok(())
}

/// Recover every value dumped into `output`, in output order.
///
/// Text outside the markers is ignored.
///
/// # Errors
/// Returns [`DumpError::Json`] for the first payload that does not decode as
/// a `T`.
pub fn collect_dumped_objects<T: DeserializeOwned>(output: &str) -> Result<Vec<T>, DumpError> {
    DUMPED
        .captures_iter(output)
        .filter_map(|captures| captures.get(1))
        .map(|payload| serde_json::from_str(payload.as_str()).map_err(DumpError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn dumps_one_line_per_value() {
        let mut out = Vec::new();
        dump_objects_to(&mut out, &[json!({"step": "Given"}), json!([1, 2])])
            .unwrap_or_else(|err| panic!("dump should succeed: {err}"));
        let text = String::from_utf8(out).unwrap_or_else(|err| panic!("utf-8 expected: {err}"));
        assert_eq!(
            text,
            "_featureflow_>>>{\"step\":\"Given\"}<<<_featureflow_\n_featureflow_>>>[1,2]<<<_featureflow_\n"
        );
    }

    #[rstest]
    #[case("", 0)]
    #[case("collected 3 items\n", 0)]
    #[case("noise _featureflow_>>>1<<<_featureflow_ more _featureflow_>>>\"x\"<<<_featureflow_", 2)]
    fn ignores_surrounding_output(#[case] output: &str, #[case] expected: usize) {
        let values: Vec<Value> = collect_dumped_objects(output)
            .unwrap_or_else(|err| panic!("collection should succeed: {err}"));
        assert_eq!(values.len(), expected);
    }

    #[test]
    fn reports_undecodable_payloads() {
        let output = "_featureflow_>>>not json<<<_featureflow_";
        let Err(err) = collect_dumped_objects::<Value>(output) else {
            panic!("payload is not json");
        };
        assert!(matches!(err, DumpError::Json(_)));
    }
}
