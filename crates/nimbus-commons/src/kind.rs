//! Datastore kind derived from a record type name.

use crate::errors::{NimbusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix reserved by Datastore for its own metadata kinds (`__kind__`,
/// `__namespace__`, ...). User kinds must never start with it.
pub const RESERVED_KIND_PREFIX: &str = "__";

/// The storage category of a record, mapped 1:1 from the record type's fully
/// qualified type name.
///
/// A `Kind` is validated once at construction and immutable afterwards:
/// the name must be non-empty and must not start with the reserved `__`
/// prefix. Ordinary dotted type names pass through unchanged.
///
/// ## Example
///
/// ```
/// use nimbus_commons::Kind;
///
/// let kind = Kind::new("example.orders.Order").unwrap();
/// assert_eq!(kind.as_str(), "example.orders.Order");
///
/// assert!(Kind::new("__reserved.Type").is_err());
/// assert!(Kind::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Kind(String);

impl Kind {
    /// Creates a kind from a fully qualified type name.
    pub fn new(type_name: impl Into<String>) -> Result<Self> {
        let name = type_name.into();
        if name.is_empty() {
            return Err(NimbusError::invalid_argument("kind must not be empty"));
        }
        if name.starts_with(RESERVED_KIND_PREFIX) {
            return Err(NimbusError::invalid_argument(format!(
                "kind '{}' starts with the reserved prefix '{}'",
                name, RESERVED_KIND_PREFIX
            )));
        }
        Ok(Self(name))
    }

    /// Returns the kind as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Kind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
