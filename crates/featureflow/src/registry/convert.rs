//! Type-erased argument values and the converters that produce them.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Why a converter rejected its input.
pub type ConversionCause = Box<dyn Error + Send + Sync>;

/// Turns raw captured text into an [`ArgValue`].
pub type Converter = Arc<dyn Fn(&str) -> Result<ArgValue, ConversionCause> + Send + Sync>;

/// A step argument of any type.
///
/// # Examples
/// ```
/// use featureflow::registry::ArgValue;
///
/// let value = ArgValue::new(42_u32);
/// assert_eq!(value.downcast_ref::<u32>(), Some(&42));
/// assert!(value.downcast_ref::<i64>().is_none());
/// ```
#[derive(Clone)]
pub struct ArgValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ArgValue {
    /// Wrap `value`.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().downcast_ref::<T>()
    }

    /// Whether the value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.as_ref().is::<T>()
    }

    /// Name of the wrapped type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArgValue").field(&self.type_name).finish()
    }
}

fn parsed<T>(raw: &str) -> Result<ArgValue, ConversionCause>
where
    T: FromStr + Any + Send + Sync,
    T::Err: Error + Send + Sync + 'static,
{
    raw.trim().parse::<T>().map(ArgValue::new).map_err(Into::into)
}

fn boolean(raw: &str) -> Result<ArgValue, ConversionCause> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Ok(ArgValue::new(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(ArgValue::new(false))
    } else {
        Err(format!("{raw:?} is not a boolean").into())
    }
}

fn text(raw: &str) -> Result<ArgValue, ConversionCause> {
    Ok(ArgValue::new(raw.to_owned()))
}

/// Converter selected by a format field's type hint.
///
/// `d` converts to `i64` and `f` to `f64`; `w`, `S` and `String` keep the
/// text. Unknown hints have no converter.
#[must_use]
pub fn hint_converter(hint: &str) -> Option<Converter> {
    let convert: fn(&str) -> Result<ArgValue, ConversionCause> = match hint {
        "u8" => parsed::<u8>,
        "u16" => parsed::<u16>,
        "u32" => parsed::<u32>,
        "u64" => parsed::<u64>,
        "u128" => parsed::<u128>,
        "usize" => parsed::<usize>,
        "i8" => parsed::<i8>,
        "i16" => parsed::<i16>,
        "i32" => parsed::<i32>,
        "i64" | "d" => parsed::<i64>,
        "i128" => parsed::<i128>,
        "isize" => parsed::<isize>,
        "f32" => parsed::<f32>,
        "f64" | "f" => parsed::<f64>,
        "bool" => boolean,
        "w" | "S" | "String" => text,
        _ => return None,
    };
    Some(Arc::new(convert))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn convert(hint: &str, raw: &str) -> Result<ArgValue, ConversionCause> {
        let Some(converter) = hint_converter(hint) else {
            panic!("hint {hint} should have a converter");
        };
        converter(raw)
    }

    #[rstest]
    #[case("u8", "255")]
    #[case("usize", "7")]
    #[case("d", "-3")]
    #[case("i128", "+12")]
    fn converts_integers(#[case] hint: &str, #[case] raw: &str) {
        assert!(convert(hint, raw).is_ok());
    }

    #[test]
    fn integer_values_keep_their_type() {
        let value = convert("u32", "12").unwrap_or_else(|err| panic!("u32: {err}"));
        assert_eq!(value.downcast_ref::<u32>(), Some(&12));
        let value = convert("d", "-4").unwrap_or_else(|err| panic!("d: {err}"));
        assert_eq!(value.downcast_ref::<i64>(), Some(&-4));
    }

    #[test]
    fn floats_accept_special_values() {
        let value = convert("f64", "inf").unwrap_or_else(|err| panic!("f64: {err}"));
        assert_eq!(value.downcast_ref::<f64>(), Some(&f64::INFINITY));
    }

    #[rstest]
    #[case("TRUE", true)]
    #[case("false", false)]
    fn converts_booleans_ignoring_case(#[case] raw: &str, #[case] expected: bool) {
        let value = convert("bool", raw).unwrap_or_else(|err| panic!("bool: {err}"));
        assert_eq!(value.downcast_ref::<bool>(), Some(&expected));
    }

    #[rstest]
    #[case("u8", "256")]
    #[case("u32", "-1")]
    #[case("bool", "yes")]
    fn rejects_out_of_range_text(#[case] hint: &str, #[case] raw: &str) {
        assert!(convert(hint, raw).is_err());
    }

    #[test]
    fn text_hints_keep_the_string() {
        let value = convert("S", "token").unwrap_or_else(|err| panic!("S: {err}"));
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("token"));
        assert!(hint_converter("uuid").is_none());
    }
}
