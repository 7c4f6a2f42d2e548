//! Convenience builder for form-encoded request bodies.
//!
//! Every write endpoint of the Tilaa API takes an
//! `application/x-www-form-urlencoded` body. This helper collects the pairs in
//! insertion order and skips absent optional values.

use std::fmt::Display;

/// Builder for assembling form field pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(&'static str, String)>,
}

impl FormParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append `key=true` when the flag is set.
    pub fn push_flag(&mut self, key: &'static str, enabled: bool) {
        if enabled {
            self.pairs.push((key, "true".to_string()));
        }
    }

    /// Chainable form of [`FormParams::push`].
    #[must_use]
    pub fn with<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: Display,
    {
        self.push(key, value);
        self
    }

    /// Return the first value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a value has been recorded for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Borrow the collected key/value pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Returns the number of recorded pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
