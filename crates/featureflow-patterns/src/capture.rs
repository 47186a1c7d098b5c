//! Regex capture helpers.

use regex::Regex;

/// Return the values of every explicit capture group when `text` matches `re`.
///
/// Group 0 is skipped. Groups that did not participate in the match yield an
/// empty string so values stay aligned with the pattern's fields.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use featureflow_patterns::extract_captured_values;
/// let regex = Regex::new(r"^(\d+)-(\w+)$")
///     .expect("example ensures fallible call succeeds");
/// let values = extract_captured_values(&regex, "42-answer")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(values, vec!["42".to_string(), "answer".to_string()]);
/// ```
///
/// ```
/// # use regex::Regex;
/// # use featureflow_patterns::extract_captured_values;
/// let regex = Regex::new(r"^(\d+)$")
///     .expect("example ensures fallible call succeeds");
/// assert!(extract_captured_values(&regex, "nope").is_none());
/// ```
#[must_use]
pub fn extract_captured_values(re: &Regex, text: &str) -> Option<Vec<String>> {
    let caps = re.captures(text)?;
    Some(
        caps.iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
            .collect(),
    )
}
