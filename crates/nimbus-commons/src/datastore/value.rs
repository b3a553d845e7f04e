//! Datastore-native property values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A value shape Datastore stores natively.
///
/// Timestamps are carried as epoch milliseconds, which is exactly the
/// precision the backend round-trips through the column-type adapter
/// (sub-millisecond precision is truncated on write by design).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DsValue {
    Null,
    Str(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// Epoch milliseconds, UTC.
    Timestamp(i64),
}

impl DsValue {
    /// Compares two values of the same shape, the way Datastore orders
    /// property values when evaluating inequality filters.
    ///
    /// Values of different shapes (and `Null`) are incomparable and return
    /// `None`; a filter comparing them simply does not match.
    pub fn compare(&self, other: &DsValue) -> Option<Ordering> {
        match (self, other) {
            (DsValue::Str(a), DsValue::Str(b)) => Some(a.cmp(b)),
            (DsValue::Integer(a), DsValue::Integer(b)) => Some(a.cmp(b)),
            (DsValue::Double(a), DsValue::Double(b)) => a.partial_cmp(b),
            (DsValue::Boolean(a), DsValue::Boolean(b)) => Some(a.cmp(b)),
            (DsValue::Timestamp(a), DsValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for DsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DsValue::Null => write!(f, "null"),
            DsValue::Str(s) => write!(f, "{:?}", s),
            DsValue::Integer(i) => write!(f, "{}", i),
            DsValue::Double(d) => write!(f, "{}", d),
            DsValue::Boolean(b) => write!(f, "{}", b),
            DsValue::Timestamp(ms) => write!(f, "timestamp({}ms)", ms),
        }
    }
}
