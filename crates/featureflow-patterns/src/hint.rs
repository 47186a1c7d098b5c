//! Field type-hint helpers used during regex compilation.

const FLOAT: &str = r"(?i:(?:[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?|nan|inf|infinity))";

/// Translate a field type hint into a regular-expression fragment.
///
/// Rust primitive names and the short `parse`-style hints (`d`, `f`, `w`,
/// `S`) are recognised. Unknown hints fall back to a lazy match so custom
/// converters can still be attached to them.
///
/// # Examples
/// ```
/// use featureflow_patterns::get_type_pattern;
/// assert_eq!(get_type_pattern(Some("u32")), r"\d+");
/// assert_eq!(get_type_pattern(Some("w")), r"\w+");
/// assert_eq!(get_type_pattern(None), ".+?");
/// ```
#[must_use]
pub fn get_type_pattern(type_hint: Option<&str>) -> &'static str {
    match type_hint {
        Some("u8" | "u16" | "u32" | "u64" | "u128" | "usize") => r"\d+",
        Some("i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "d") => r"[+-]?\d+",
        Some("f32" | "f64" | "f") => FLOAT,
        Some("bool") => r"(?i:true|false)",
        Some("w") => r"\w+",
        Some("S") => r"\S+",
        _ => r".+?",
    }
}
