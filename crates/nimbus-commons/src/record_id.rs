//! Record identifiers and their string transform.
//!
//! Datastore keys carry a single string name segment, so every framework-level
//! identifier is transformed to a string on write and parsed back on read.
//! The transform is lossless for every supported identifier shape:
//!
//! - numeric ids serialize to their decimal string and parse back to the
//!   original numeric type;
//! - string ids pass through unchanged;
//! - structured ids serialize to canonical compact JSON and parse back
//!   through `serde_json`.
//!
//! Any other shape (bool, float, null, array) is rejected with an
//! invalid-argument error.

use crate::errors::{NimbusError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// The string form of a record identifier, used as the name segment of a
/// Datastore key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the record id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Shape discriminator for [`EntityId`], used to direct the parse side of the
/// string transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdKind {
    Int,
    Long,
    Text,
    Structured,
}

/// A framework-level entity identifier.
///
/// `Structured` carries the identifier message as a JSON object; non-object
/// JSON shapes are not valid identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityId {
    Int(i32),
    Long(i64),
    Text(String),
    Structured(JsonValue),
}

impl EntityId {
    /// Returns the shape discriminator of this identifier.
    pub fn kind(&self) -> IdKind {
        match self {
            EntityId::Int(_) => IdKind::Int,
            EntityId::Long(_) => IdKind::Long,
            EntityId::Text(_) => IdKind::Text,
            EntityId::Structured(_) => IdKind::Structured,
        }
    }

    /// Builds an identifier from a raw JSON value, rejecting shapes the
    /// transform does not support.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(EntityId::Long(i))
                } else {
                    Err(NimbusError::invalid_argument(format!(
                        "unsupported identifier shape: non-integer number {}",
                        n
                    )))
                }
            }
            JsonValue::String(s) => Ok(EntityId::Text(s)),
            JsonValue::Object(map) => Ok(EntityId::Structured(JsonValue::Object(map))),
            other => Err(NimbusError::invalid_argument(format!(
                "unsupported identifier shape: {}",
                other
            ))),
        }
    }

    /// Transforms this identifier into its record-id string form.
    pub fn to_record_id(&self) -> Result<RecordId> {
        let s = match self {
            EntityId::Int(i) => i.to_string(),
            EntityId::Long(l) => l.to_string(),
            EntityId::Text(t) => t.clone(),
            EntityId::Structured(v) => {
                if !v.is_object() {
                    return Err(NimbusError::invalid_argument(format!(
                        "structured identifier must be a JSON object, got: {}",
                        v
                    )));
                }
                serde_json::to_string(v)?
            }
        };
        Ok(RecordId::new(s))
    }

    /// Parses a record id back into the identifier shape it was produced
    /// from.
    pub fn from_record_id(id: &RecordId, kind: IdKind) -> Result<Self> {
        match kind {
            IdKind::Int => id
                .as_str()
                .parse::<i32>()
                .map(EntityId::Int)
                .map_err(|e| {
                    NimbusError::invalid_argument(format!(
                        "record id '{}' is not a valid i32 identifier: {}",
                        id, e
                    ))
                }),
            IdKind::Long => id
                .as_str()
                .parse::<i64>()
                .map(EntityId::Long)
                .map_err(|e| {
                    NimbusError::invalid_argument(format!(
                        "record id '{}' is not a valid i64 identifier: {}",
                        id, e
                    ))
                }),
            IdKind::Text => Ok(EntityId::Text(id.as_str().to_string())),
            IdKind::Structured => {
                let value: JsonValue = serde_json::from_str(id.as_str())?;
                EntityId::from_json(value)
            }
        }
    }
}

impl fmt::Display for EntityId {
    /// Renders via the string transform; identifiers that fail the transform
    /// fall back to their debug form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_record_id() {
            Ok(id) => write!(f, "{}", id),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_ids_round_trip() {
        let id = EntityId::Int(42);
        let record_id = id.to_record_id().unwrap();
        assert_eq!(record_id.as_str(), "42");
        assert_eq!(EntityId::from_record_id(&record_id, IdKind::Int).unwrap(), id);

        let id = EntityId::Long(-9_000_000_000);
        let record_id = id.to_record_id().unwrap();
        assert_eq!(
            EntityId::from_record_id(&record_id, IdKind::Long).unwrap(),
            id
        );
    }

    #[test]
    fn test_text_id_is_identity() {
        let id = EntityId::Text("order-2041".to_string());
        let record_id = id.to_record_id().unwrap();
        assert_eq!(record_id.as_str(), "order-2041");
        assert_eq!(
            EntityId::from_record_id(&record_id, IdKind::Text).unwrap(),
            id
        );
    }

    #[test]
    fn test_structured_id_round_trips_via_compact_json() {
        let id = EntityId::Structured(json!({"region": "eu", "seq": 17}));
        let record_id = id.to_record_id().unwrap();
        // Compact encoding: no whitespace.
        assert!(!record_id.as_str().contains(' '));
        assert_eq!(
            EntityId::from_record_id(&record_id, IdKind::Structured).unwrap(),
            id
        );
    }

    #[test]
    fn test_unsupported_shapes_are_rejected() {
        for value in [json!(true), json!(1.5), json!(null), json!([1, 2])] {
            let err = EntityId::from_json(value).unwrap_err();
            assert!(matches!(err, NimbusError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_parse_failure_is_invalid_argument() {
        let err = EntityId::from_record_id(&RecordId::new("not-a-number"), IdKind::Long)
            .unwrap_err();
        assert!(matches!(err, NimbusError::InvalidArgument(_)));
    }
}
