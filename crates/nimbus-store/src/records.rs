//! Record envelopes persisted by the storage implementations.
//!
//! Every envelope serializes to compact JSON and is stored on the entity
//! under the reserved `record` property; queryable attributes are
//! additionally denormalized as named properties through the column-type
//! registry.

use chrono::{DateTime, Utc};
use nimbus_commons::{Column, ColumnValue, NimbusError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Name of the entity property holding the serialized record envelope.
/// Columns may not use it.
pub const RECORD_PROPERTY: &str = "record";

/// The stored form of an entity state: its type URL, the state itself as
/// compact JSON, and the entity version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub type_url: String,
    pub state: JsonValue,
    pub version: i32,
}

/// An [`EntityRecord`] together with the column values to denormalize onto
/// the stored entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecordWithColumns {
    pub record: EntityRecord,
    pub columns: Vec<(Column, ColumnValue)>,
}

impl EntityRecordWithColumns {
    /// A record with no queryable columns.
    pub fn without_columns(record: EntityRecord) -> Self {
        Self {
            record,
            columns: Vec::new(),
        }
    }

    /// Checks that no column collides with the reserved record property.
    pub fn validate(&self) -> Result<()> {
        for (column, _) in &self.columns {
            if column.name() == RECORD_PROPERTY {
                return Err(NimbusError::invalid_argument(format!(
                    "column name '{}' is reserved for the record envelope",
                    RECORD_PROPERTY
                )));
            }
        }
        Ok(())
    }
}

/// What an aggregate history element carries: a plain event or a state
/// snapshot that truncates replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateRecordKind {
    Event,
    Snapshot,
}

/// One element of an aggregate's event history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEventRecord {
    pub record_kind: AggregateRecordKind,
    pub payload: JsonValue,
    pub version: i32,
    pub timestamp: DateTime<Utc>,
}

/// A persisted domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: String,
    pub event_type: String,
    pub producer_id: String,
    pub payload: JsonValue,
    pub timestamp: DateTime<Utc>,
}

/// Processing status of a stored command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    Received,
    Scheduled,
    Ok,
    Error,
}

impl CommandStatus {
    /// Stable string form used for the status column.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Received => "RECEIVED",
            CommandStatus::Scheduled => "SCHEDULED",
            CommandStatus::Ok => "OK",
            CommandStatus::Error => "ERROR",
        }
    }
}

/// A persisted command with its processing status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command_id: String,
    pub command_type: String,
    pub payload: JsonValue,
    pub status: CommandStatus,
    pub timestamp: DateTime<Utc>,
}
