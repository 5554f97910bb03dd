//! Filter key identifier.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier grouping bound controls and the items they filter.
///
/// Keys are compared by value; the order in which a key first appears in
/// the host document has no bearing on correctness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterKey(String);

impl FilterKey {
    /// Create a filter key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for FilterKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for FilterKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
