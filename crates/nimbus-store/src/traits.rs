//! The storage contracts this adapter implements for the hosting framework.
//!
//! These traits mirror the framework's generic storage interfaces; the
//! structs in [`crate::storages`] bind them to Datastore. Tenant context is
//! an explicit parameter on every method — the adapter never consults
//! ambient tenant state.

use crate::records::{
    AggregateEventRecord, CommandRecord, CommandStatus, EntityRecord, EntityRecordWithColumns,
    StoredEvent,
};
use crate::wrapper::DatastoreWrapper;
use chrono::{DateTime, Utc};
use nimbus_commons::{EntityId, Kind, Result, TenantId};
use nimbus_queries::CompositeQueryParameter;
use std::sync::Arc;

/// Common surface every storage exposes: its kind and, as an escape hatch
/// for advanced or test use, the underlying wrapper.
pub trait Storage {
    fn kind(&self) -> &Kind;
    fn wrapper(&self) -> &Arc<DatastoreWrapper>;
}

/// Storage of entity records with queryable columns.
pub trait RecordStorage: Storage {
    fn write(
        &self,
        tenant: &TenantId,
        id: &EntityId,
        record: &EntityRecordWithColumns,
    ) -> Result<()>;

    fn write_all(
        &self,
        tenant: &TenantId,
        records: &[(EntityId, EntityRecordWithColumns)],
    ) -> Result<()>;

    fn read(&self, tenant: &TenantId, id: &EntityId) -> Result<Option<EntityRecord>>;

    /// Reads many records; ids that do not exist are absent from the result.
    fn read_multiple(&self, tenant: &TenantId, ids: &[EntityId]) -> Result<Vec<EntityRecord>>;

    fn read_all(&self, tenant: &TenantId) -> Result<Vec<EntityRecord>>;

    /// Reads the records matching a composite column predicate. The
    /// predicate is normalized by the filter engine into one or more native
    /// queries whose union is returned. An empty `params` slice carries no
    /// predicate and reads everything.
    fn read_by_query(
        &self,
        tenant: &TenantId,
        params: &[CompositeQueryParameter],
    ) -> Result<Vec<EntityRecord>>;

    /// Deletes a record, returning whether it existed.
    fn delete(&self, tenant: &TenantId, id: &EntityId) -> Result<bool>;
}

/// Append-only storage of aggregate event histories.
pub trait AggregateStorage: Storage {
    /// Appends one history element for the aggregate.
    fn write_record(
        &self,
        tenant: &TenantId,
        id: &EntityId,
        record: &AggregateEventRecord,
    ) -> Result<()>;

    /// Reads the aggregate's history, newest version first.
    fn read_history(&self, tenant: &TenantId, id: &EntityId)
        -> Result<Vec<AggregateEventRecord>>;
}

/// Append-only storage of domain events.
pub trait EventStorage: Storage {
    fn write(&self, tenant: &TenantId, event: &StoredEvent) -> Result<()>;

    fn read(&self, tenant: &TenantId, event_id: &str) -> Result<Option<StoredEvent>>;

    fn read_all(&self, tenant: &TenantId) -> Result<Vec<StoredEvent>>;

    /// Column-predicate query over stored events (by type, time range, ...).
    fn read_by_query(
        &self,
        tenant: &TenantId,
        params: &[CompositeQueryParameter],
    ) -> Result<Vec<StoredEvent>>;
}

/// Storage of commands and their processing status.
pub trait CommandStorage: Storage {
    fn write(&self, tenant: &TenantId, command: &CommandRecord) -> Result<()>;

    fn read(&self, tenant: &TenantId, command_id: &str) -> Result<Option<CommandRecord>>;

    fn read_by_status(
        &self,
        tenant: &TenantId,
        status: CommandStatus,
    ) -> Result<Vec<CommandRecord>>;
}

/// Record storage extended with projection bookkeeping: the timestamp of the
/// last event the projection has handled.
pub trait ProjectionStorage: RecordStorage {
    fn write_last_handled_event_time(
        &self,
        tenant: &TenantId,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;

    fn read_last_handled_event_time(&self, tenant: &TenantId)
        -> Result<Option<DateTime<Utc>>>;
}
