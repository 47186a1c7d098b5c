//! Arguments handed to step handlers.

use std::any::Any;
use std::collections::BTreeMap;

use super::error::StepError;
use crate::registry::ArgValue;

/// Parameter receiving the data table rows as `Vec<Vec<String>>`.
pub const DATATABLE: &str = "datatable";
/// Parameter receiving the transposed data table rows as `Vec<Vec<String>>`.
pub const DATATABLE_TRANSPOSED: &str = "datatable_transposed";
/// Parameter receiving the data table as `BTreeMap<String, Vec<String>>`
/// keyed by header.
pub const DATATABLE_COLUMNS: &str = "datatable_columns";
/// Parameter receiving the doc string content as `String`.
pub const DOCSTRING: &str = "docstring";

/// Names filled from the step itself rather than from fixtures.
pub const RESERVED_PARAMETERS: [&str; 4] =
    [DATATABLE, DATATABLE_TRANSPOSED, DATATABLE_COLUMNS, DOCSTRING];

/// Named arguments for one handler call.
#[derive(Debug, Clone, Default)]
pub struct StepArguments {
    values: BTreeMap<String, ArgValue>,
}

impl StepArguments {
    /// No arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set argument `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    /// Whether argument `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Argument names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The untyped value of `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Borrow argument `name` as a `T`.
    ///
    /// # Errors
    /// Returns [`StepError::MissingArgument`] when the argument is absent and
    /// [`StepError::ArgumentType`] when it holds another type.
    ///
    /// # Examples
    /// ```
    /// use featureflow::execution::StepArguments;
    /// use featureflow::registry::ArgValue;
    ///
    /// let mut args = StepArguments::new();
    /// args.insert("count", ArgValue::new(3_u32));
    /// assert_eq!(args.get::<u32>("count").ok(), Some(&3));
    /// assert!(args.get::<String>("count").is_err());
    /// assert!(args.get::<u32>("missing").is_err());
    /// ```
    pub fn get<T: Any>(&self, name: &str) -> Result<&T, StepError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| StepError::MissingArgument {
                name: name.to_owned(),
            })?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| StepError::ArgumentType {
                name: name.to_owned(),
                expected: std::any::type_name::<T>(),
                actual: value.type_name(),
            })
    }

    /// Borrow a text argument.
    ///
    /// # Errors
    /// See [`StepArguments::get`].
    pub fn text(&self, name: &str) -> Result<&str, StepError> {
        self.get::<String>(name).map(String::as_str)
    }

    /// The data table rows.
    ///
    /// # Errors
    /// See [`StepArguments::get`].
    pub fn datatable(&self) -> Result<&Vec<Vec<String>>, StepError> {
        self.get(DATATABLE)
    }

    /// The doc string content.
    ///
    /// # Errors
    /// See [`StepArguments::get`].
    pub fn docstring(&self) -> Result<&str, StepError> {
        self.text(DOCSTRING)
    }
}

impl FromIterator<(String, ArgValue)> for StepArguments {
    fn from_iter<I: IntoIterator<Item = (String, ArgValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
