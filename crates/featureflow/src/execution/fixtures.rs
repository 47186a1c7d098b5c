//! Fixture lookup for handler parameters.

use std::any::Any;
use std::collections::HashMap;

use crate::registry::ArgValue;

/// Supplies values for handler parameters that neither the pattern nor the
/// step provides.
pub trait FixtureResolver {
    /// The value of fixture `name`, if available.
    fn resolve(&self, name: &str) -> Option<ArgValue>;
}

/// A resolver that provides nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFixtures;

impl FixtureResolver for NoFixtures {
    fn resolve(&self, _name: &str) -> Option<ArgValue> {
        None
    }
}

/// Fixtures held in a map.
///
/// # Examples
/// ```
/// use featureflow::execution::{FixtureMap, FixtureResolver};
///
/// let fixtures = FixtureMap::new().with("currency", "EUR".to_owned());
/// let value = fixtures.resolve("currency").expect("fixture was added");
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("EUR"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureMap {
    values: HashMap<String, ArgValue>,
}

impl FixtureMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fixture `name`.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), ArgValue::new(value));
    }

    /// Builder form of [`FixtureMap::insert`].
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    /// Names of the available fixtures, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FixtureResolver for FixtureMap {
    fn resolve(&self, name: &str) -> Option<ArgValue> {
        self.values.get(name).cloned()
    }
}
