//! The column model: named, typed attributes of framework entities.
//!
//! Columns are produced by the hosting framework's entity metadata and used
//! two ways by the adapter: denormalized onto the stored entity as named
//! properties, and referenced by query predicates. Each column declares a
//! value type which the column-type registry maps to a Datastore-storable
//! value shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Declared value type of a column. This is the discriminator the
/// column-type registry keys its mappings on.
///
/// `Custom` carries a registered-type id for caller-supplied mappings; the
/// built-in variants cover the framework's standard column types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnType {
    String,
    Integer,
    Boolean,
    Timestamp,
    Message,
    Version,
    Custom(String),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Message => write!(f, "message"),
            ColumnType::Version => write!(f, "version"),
            ColumnType::Custom(id) => write!(f, "custom:{}", id),
        }
    }
}

/// A named, typed entity attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    name: String,
    column_type: ColumnType,
}

impl Column {
    /// Creates a column with the given name and declared value type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Returns the column name, used as the stored property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value type.
    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.column_type)
    }
}

/// A framework-typed column value.
///
/// `Null` is an explicit absent-value marker: a column whose value is null is
/// still written to the stored entity (as the mapping's null value), which is
/// different from omitting the property entirely.
///
/// `Custom` pairs a registered-type id with an opaque JSON payload so that
/// caller-registered mappings can move values the built-in variants do not
/// cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Message(JsonValue),
    Version(i32),
    Custom { type_id: String, value: JsonValue },
}

impl ColumnValue {
    /// Returns the [`ColumnType`] this value belongs to, or `None` for
    /// `Null` (a null carries no type of its own; the column declares it).
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            ColumnValue::Null => None,
            ColumnValue::String(_) => Some(ColumnType::String),
            ColumnValue::Integer(_) => Some(ColumnType::Integer),
            ColumnValue::Boolean(_) => Some(ColumnType::Boolean),
            ColumnValue::Timestamp(_) => Some(ColumnType::Timestamp),
            ColumnValue::Message(_) => Some(ColumnType::Message),
            ColumnValue::Version(_) => Some(ColumnType::Version),
            ColumnValue::Custom { type_id, .. } => Some(ColumnType::Custom(type_id.clone())),
        }
    }

    /// True for the explicit null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}
