//! Format-style step pattern utilities for featureflow.
//!
//! The crate compiles patterns such as `I have {count:u32} {item}` into
//! anchored regular expressions, records the fields they declare, and exposes
//! the canonical [`StepKeyword`] used to categorise step definitions. It is
//! kept separate from the runtime so the pattern grammar can be tested on its
//! own.

mod capture;
mod errors;
mod hint;
mod keyword;
mod pattern;

pub use capture::extract_captured_values;
pub use errors::{PatternError, PlaceholderErrorInfo};
pub use hint::get_type_pattern;
pub use keyword::{StepKeyword, StepKeywordParseError};
pub use pattern::{CapturedField, CompiledPattern, PatternField, build_regex_from_pattern};
