//! Panic payload formatting.
//!
//! Step handlers run under `catch_unwind`; the payload of a caught panic is
//! turned into the message carried by
//! [`StepError::Panic`](crate::execution::StepError::Panic).

use std::any::Any;

/// Render a panic payload as text.
///
/// `&str` and `String` payloads, the ones `panic!` produces, are returned
/// as is. Integer and float payloads are formatted; anything else falls back
/// to its `Debug` form.
///
/// # Examples
///
/// ```
/// use featureflow::panic_message;
///
/// let caught = std::panic::catch_unwind(|| panic!("basket is {}", "empty"));
/// if let Err(payload) = caught {
///     assert_eq!(panic_message(payload.as_ref()), "basket is empty");
/// }
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    macro_rules! display_any {
        ($($ty:ty),+ $(,)?) => {
            None$(.or_else(|| payload.downcast_ref::<$ty>().map(ToString::to_string)))+
        };
    }

    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .or_else(|| {
            display_any!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64)
        })
        .unwrap_or_else(|| format!("{payload:?}"))
}
