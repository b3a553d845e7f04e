//! Bidirectional conversion between column values and Datastore values.
//!
//! Each supported column type has one [`ColumnTypeMapping`] implementation,
//! stored in a [`ColumnTypeRegistry`] keyed by the column's declared type.
//! Registration happens when the storage factory is constructed: callers may
//! override a default mapping or add mappings for custom types. A value that
//! reaches a column with no registered mapping fails loudly — the adapter
//! never coerces or drops a column silently.
//!
//! ## Default mappings
//!
//! | column type | stored shape                          |
//! |-------------|---------------------------------------|
//! | string      | string                                |
//! | integer     | integer                               |
//! | boolean     | boolean                               |
//! | timestamp   | datetime, truncated to milliseconds   |
//! | message     | compact JSON string                   |
//! | version     | integer (the version number)          |
//!
//! The millisecond truncation of timestamps is deliberate and load-bearing:
//! callers assert on millisecond-truncated round-trips, so preserving finer
//! precision here would be a behavior change, not a fix.

use crate::column::{Column, ColumnType, ColumnValue};
use crate::datastore::value::DsValue;
use crate::errors::{NimbusError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Converts one column type to and from its Datastore-stored shape.
///
/// `null_value` is the explicit absent-value marker written when a column's
/// value is [`ColumnValue::Null`]; writing it is distinct from omitting the
/// property entirely.
pub trait ColumnTypeMapping: Send + Sync {
    /// Converts a framework value to its stored shape.
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue>;

    /// Converts a stored value back to the framework shape.
    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue>;

    /// The stored marker for an explicitly null column value.
    fn null_value(&self) -> DsValue {
        DsValue::Null
    }
}

fn mismatch(expected: &str, got: &dyn std::fmt::Debug) -> NimbusError {
    NimbusError::conversion(format!("expected a {} value, got {:?}", expected, got))
}

struct StringMapping;

impl ColumnTypeMapping for StringMapping {
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
        match value {
            ColumnValue::String(s) => Ok(DsValue::Str(s.clone())),
            other => Err(mismatch("string", other)),
        }
    }

    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
        match value {
            DsValue::Str(s) => Ok(ColumnValue::String(s.clone())),
            DsValue::Null => Ok(ColumnValue::Null),
            other => Err(mismatch("string", other)),
        }
    }
}

struct IntegerMapping;

impl ColumnTypeMapping for IntegerMapping {
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
        match value {
            ColumnValue::Integer(i) => Ok(DsValue::Integer(*i)),
            other => Err(mismatch("integer", other)),
        }
    }

    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
        match value {
            DsValue::Integer(i) => Ok(ColumnValue::Integer(*i)),
            DsValue::Null => Ok(ColumnValue::Null),
            other => Err(mismatch("integer", other)),
        }
    }
}

struct BooleanMapping;

impl ColumnTypeMapping for BooleanMapping {
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
        match value {
            ColumnValue::Boolean(b) => Ok(DsValue::Boolean(*b)),
            other => Err(mismatch("boolean", other)),
        }
    }

    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
        match value {
            DsValue::Boolean(b) => Ok(ColumnValue::Boolean(*b)),
            DsValue::Null => Ok(ColumnValue::Null),
            other => Err(mismatch("boolean", other)),
        }
    }
}

/// Timestamps are stored as epoch milliseconds. Sub-millisecond precision is
/// truncated on write — an accepted lossy conversion, not a bug.
struct TimestampMapping;

impl ColumnTypeMapping for TimestampMapping {
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
        match value {
            ColumnValue::Timestamp(ts) => Ok(DsValue::Timestamp(ts.timestamp_millis())),
            other => Err(mismatch("timestamp", other)),
        }
    }

    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
        match value {
            DsValue::Timestamp(ms) => {
                let ts: DateTime<Utc> = Utc.timestamp_millis_opt(*ms).single().ok_or_else(|| {
                    NimbusError::conversion(format!("{} is out of range for a timestamp", ms))
                })?;
                Ok(ColumnValue::Timestamp(ts))
            }
            DsValue::Null => Ok(ColumnValue::Null),
            other => Err(mismatch("timestamp", other)),
        }
    }
}

/// Structured messages are stored as compact JSON strings.
struct MessageMapping;

impl ColumnTypeMapping for MessageMapping {
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
        match value {
            ColumnValue::Message(m) => Ok(DsValue::Str(serde_json::to_string(m)?)),
            other => Err(mismatch("message", other)),
        }
    }

    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
        match value {
            DsValue::Str(s) => {
                let message: JsonValue = serde_json::from_str(s)?;
                Ok(ColumnValue::Message(message))
            }
            DsValue::Null => Ok(ColumnValue::Null),
            other => Err(mismatch("message", other)),
        }
    }
}

/// Version wrappers store only the version number.
struct VersionMapping;

impl ColumnTypeMapping for VersionMapping {
    fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
        match value {
            ColumnValue::Version(v) => Ok(DsValue::Integer(i64::from(*v))),
            other => Err(mismatch("version", other)),
        }
    }

    fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
        match value {
            DsValue::Integer(i) => {
                let v = i32::try_from(*i).map_err(|_| {
                    NimbusError::conversion(format!("{} is out of range for a version number", i))
                })?;
                Ok(ColumnValue::Version(v))
            }
            DsValue::Null => Ok(ColumnValue::Null),
            other => Err(mismatch("version", other)),
        }
    }
}

/// The active set of column-type mappings.
///
/// Lookup is by declared column type. `register` overrides a default mapping
/// when the type already has one and is strictly additive for new
/// (`ColumnType::Custom`) discriminators.
///
/// ## Example
///
/// ```
/// use nimbus_commons::{Column, ColumnType, ColumnValue, ColumnTypeRegistry, DsValue};
///
/// let registry = ColumnTypeRegistry::default();
/// let column = Column::new("name", ColumnType::String);
/// let stored = registry
///     .to_ds_value(&column, &ColumnValue::String("a".into()))
///     .unwrap();
/// assert_eq!(stored, DsValue::Str("a".into()));
/// ```
pub struct ColumnTypeRegistry {
    mappings: BTreeMap<ColumnType, Arc<dyn ColumnTypeMapping>>,
}

impl Default for ColumnTypeRegistry {
    fn default() -> Self {
        let mut registry = Self {
            mappings: BTreeMap::new(),
        };
        registry.register(ColumnType::String, Arc::new(StringMapping));
        registry.register(ColumnType::Integer, Arc::new(IntegerMapping));
        registry.register(ColumnType::Boolean, Arc::new(BooleanMapping));
        registry.register(ColumnType::Timestamp, Arc::new(TimestampMapping));
        registry.register(ColumnType::Message, Arc::new(MessageMapping));
        registry.register(ColumnType::Version, Arc::new(VersionMapping));
        registry
    }
}

impl ColumnTypeRegistry {
    /// A registry with no mappings at all. Mostly useful in tests; normal
    /// construction starts from [`ColumnTypeRegistry::default`].
    pub fn empty() -> Self {
        Self {
            mappings: BTreeMap::new(),
        }
    }

    /// Registers a mapping, overriding any existing mapping for the type.
    pub fn register(&mut self, column_type: ColumnType, mapping: Arc<dyn ColumnTypeMapping>) {
        self.mappings.insert(column_type, mapping);
    }

    /// True when the type has a registered mapping.
    pub fn supports(&self, column_type: &ColumnType) -> bool {
        self.mappings.contains_key(column_type)
    }

    fn mapping_for(&self, column: &Column) -> Result<&Arc<dyn ColumnTypeMapping>> {
        self.mappings.get(column.column_type()).ok_or_else(|| {
            NimbusError::conversion(format!(
                "no mapping registered for column '{}' of type '{}'",
                column.name(),
                column.column_type()
            ))
        })
    }

    /// Converts a column value to its stored shape. A null value stores the
    /// mapping's explicit null marker.
    pub fn to_ds_value(&self, column: &Column, value: &ColumnValue) -> Result<DsValue> {
        let mapping = self.mapping_for(column)?;
        if value.is_null() {
            return Ok(mapping.null_value());
        }
        mapping.to_ds_value(value).map_err(|e| {
            NimbusError::conversion(format!("column '{}': {}", column.name(), e))
        })
    }

    /// Converts a stored value back to the framework shape.
    pub fn from_ds_value(&self, column: &Column, value: &DsValue) -> Result<ColumnValue> {
        let mapping = self.mapping_for(column)?;
        mapping.from_ds_value(value).map_err(|e| {
            NimbusError::conversion(format!("column '{}': {}", column.name(), e))
        })
    }

    /// The stored null marker for the column's type.
    pub fn null_for(&self, column: &Column) -> Result<DsValue> {
        Ok(self.mapping_for(column)?.null_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_default_mappings_round_trip() {
        let registry = ColumnTypeRegistry::default();
        let cases = vec![
            (
                Column::new("name", ColumnType::String),
                ColumnValue::String("alice".into()),
            ),
            (
                Column::new("count", ColumnType::Integer),
                ColumnValue::Integer(-3),
            ),
            (
                Column::new("done", ColumnType::Boolean),
                ColumnValue::Boolean(true),
            ),
            (
                Column::new("payload", ColumnType::Message),
                ColumnValue::Message(json!({"a": 1})),
            ),
            (
                Column::new("version", ColumnType::Version),
                ColumnValue::Version(12),
            ),
        ];
        for (column, value) in cases {
            let stored = registry.to_ds_value(&column, &value).unwrap();
            let restored = registry.from_ds_value(&column, &stored).unwrap();
            assert_eq!(restored, value, "round trip failed for {}", column);
        }
    }

    #[test]
    fn test_timestamp_truncates_to_millis() {
        let registry = ColumnTypeRegistry::default();
        let column = Column::new("when", ColumnType::Timestamp);
        // 1.5us past the millisecond boundary is dropped.
        let ts = Utc.timestamp_opt(1_700_000_000, 123_001_500).unwrap();
        let stored = registry
            .to_ds_value(&column, &ColumnValue::Timestamp(ts))
            .unwrap();
        assert_eq!(stored, DsValue::Timestamp(1_700_000_000_123));

        let restored = registry.from_ds_value(&column, &stored).unwrap();
        let expected = Utc.timestamp_opt(1_700_000_000, 123_000_000).unwrap();
        assert_eq!(restored, ColumnValue::Timestamp(expected));
    }

    #[test]
    fn test_null_writes_explicit_marker() {
        let registry = ColumnTypeRegistry::default();
        let column = Column::new("due", ColumnType::Timestamp);
        let stored = registry.to_ds_value(&column, &ColumnValue::Null).unwrap();
        assert_eq!(stored, DsValue::Null);
        assert_eq!(
            registry.from_ds_value(&column, &stored).unwrap(),
            ColumnValue::Null
        );
    }

    #[test]
    fn test_unregistered_type_fails_loudly() {
        let registry = ColumnTypeRegistry::default();
        let column = Column::new("location", ColumnType::Custom("geo_point".into()));
        let err = registry
            .to_ds_value(
                &column,
                &ColumnValue::Custom {
                    type_id: "geo_point".into(),
                    value: json!({"lat": 1.0}),
                },
            )
            .unwrap_err();
        assert!(matches!(err, NimbusError::Conversion(_)));
    }

    #[test]
    fn test_register_is_additive_and_overriding() {
        struct GeoMapping;
        impl ColumnTypeMapping for GeoMapping {
            fn to_ds_value(&self, value: &ColumnValue) -> Result<DsValue> {
                match value {
                    ColumnValue::Custom { value, .. } => {
                        Ok(DsValue::Str(serde_json::to_string(value)?))
                    }
                    other => Err(mismatch("geo_point", other)),
                }
            }
            fn from_ds_value(&self, value: &DsValue) -> Result<ColumnValue> {
                match value {
                    DsValue::Str(s) => Ok(ColumnValue::Custom {
                        type_id: "geo_point".into(),
                        value: serde_json::from_str(s)?,
                    }),
                    other => Err(mismatch("geo_point", other)),
                }
            }
        }

        let mut registry = ColumnTypeRegistry::default();
        let geo = ColumnType::Custom("geo_point".into());
        assert!(!registry.supports(&geo));
        registry.register(geo.clone(), Arc::new(GeoMapping));
        assert!(registry.supports(&geo));

        let column = Column::new("location", geo);
        let value = ColumnValue::Custom {
            type_id: "geo_point".into(),
            value: json!({"lat": 1.0, "lng": 2.0}),
        };
        let stored = registry.to_ds_value(&column, &value).unwrap();
        assert_eq!(registry.from_ds_value(&column, &stored).unwrap(), value);
    }

    #[test]
    fn test_shape_mismatch_is_conversion_error() {
        let registry = ColumnTypeRegistry::default();
        let column = Column::new("count", ColumnType::Integer);
        let err = registry
            .to_ds_value(&column, &ColumnValue::String("7".into()))
            .unwrap_err();
        assert!(matches!(err, NimbusError::Conversion(_)));
        assert!(err.to_string().contains("count"));
    }
}
