//! Projection storage: record storage plus last-handled-event bookkeeping.

use crate::records::{EntityRecord, EntityRecordWithColumns};
use crate::traits::{ProjectionStorage, RecordStorage, Storage};
use crate::storages::record_storage::DsRecordStorage;
use crate::wrapper::DatastoreWrapper;
use chrono::{DateTime, TimeZone, Utc};
use nimbus_commons::datastore::{DsValue, Entity};
use nimbus_commons::{EntityId, Kind, NimbusError, RecordId, Result, TenantId};
use nimbus_queries::CompositeQueryParameter;
use std::sync::Arc;

/// Kind holding one bookkeeping entity per projection type.
pub const EVENT_TIME_KIND: &str = "LastHandledEventTime";

/// Property of the bookkeeping entity carrying the timestamp.
const TIMESTAMP_PROPERTY: &str = "timestamp";

/// Datastore-backed [`ProjectionStorage`].
///
/// Projection records delegate entirely to [`DsRecordStorage`]; what this
/// type adds is the timestamp of the last event the projection handled,
/// stored under a dedicated kind keyed by the projection's own kind name.
/// The timestamp is millisecond-truncated like every stored timestamp.
pub struct DsProjectionStorage {
    records: DsRecordStorage,
    event_time_kind: Kind,
}

impl DsProjectionStorage {
    pub fn new(records: DsRecordStorage) -> Self {
        Self {
            records,
            // The constant is a valid kind name.
            event_time_kind: Kind::new(EVENT_TIME_KIND).expect("valid constant kind"),
        }
    }

    fn event_time_id(&self) -> RecordId {
        RecordId::new(self.records.kind().as_str())
    }
}

impl Storage for DsProjectionStorage {
    fn kind(&self) -> &Kind {
        self.records.kind()
    }

    fn wrapper(&self) -> &Arc<DatastoreWrapper> {
        self.records.wrapper()
    }
}

impl RecordStorage for DsProjectionStorage {
    fn write(
        &self,
        tenant: &TenantId,
        id: &EntityId,
        record: &EntityRecordWithColumns,
    ) -> Result<()> {
        self.records.write(tenant, id, record)
    }

    fn write_all(
        &self,
        tenant: &TenantId,
        records: &[(EntityId, EntityRecordWithColumns)],
    ) -> Result<()> {
        self.records.write_all(tenant, records)
    }

    fn read(&self, tenant: &TenantId, id: &EntityId) -> Result<Option<EntityRecord>> {
        self.records.read(tenant, id)
    }

    fn read_multiple(&self, tenant: &TenantId, ids: &[EntityId]) -> Result<Vec<EntityRecord>> {
        self.records.read_multiple(tenant, ids)
    }

    fn read_all(&self, tenant: &TenantId) -> Result<Vec<EntityRecord>> {
        self.records.read_all(tenant)
    }

    fn read_by_query(
        &self,
        tenant: &TenantId,
        params: &[CompositeQueryParameter],
    ) -> Result<Vec<EntityRecord>> {
        self.records.read_by_query(tenant, params)
    }

    fn delete(&self, tenant: &TenantId, id: &EntityId) -> Result<bool> {
        self.records.delete(tenant, id)
    }
}

impl ProjectionStorage for DsProjectionStorage {
    fn write_last_handled_event_time(
        &self,
        tenant: &TenantId,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let factory = self.wrapper().key_factory(&self.event_time_kind, tenant);
        let entity = Entity::new(factory.new_key(self.event_time_id())).with(
            TIMESTAMP_PROPERTY,
            DsValue::Timestamp(timestamp.timestamp_millis()),
        );
        self.wrapper().create_or_update(&[entity])
    }

    fn read_last_handled_event_time(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<DateTime<Utc>>> {
        let factory = self.wrapper().key_factory(&self.event_time_kind, tenant);
        let found = self.wrapper().read(&[factory.new_key(self.event_time_id())])?;
        let Some(entity) = found.first() else {
            return Ok(None);
        };
        match entity.get(TIMESTAMP_PROPERTY) {
            Some(DsValue::Timestamp(ms)) => {
                let ts = Utc.timestamp_millis_opt(*ms).single().ok_or_else(|| {
                    NimbusError::conversion(format!(
                        "{} is out of range for a timestamp",
                        ms
                    ))
                })?;
                Ok(Some(ts))
            }
            other => Err(NimbusError::conversion(format!(
                "entity {} stores an invalid last-handled-event time: {:?}",
                entity.key(),
                other
            ))),
        }
    }
}
