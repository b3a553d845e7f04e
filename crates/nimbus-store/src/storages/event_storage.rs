//! Event storage: append-only domain events keyed by event id.

use crate::records::{StoredEvent, RECORD_PROPERTY};
use crate::traits::{EventStorage, Storage};
use crate::wrapper::DatastoreWrapper;
use nimbus_commons::datastore::{DsValue, Entity, KeyFactory};
use nimbus_commons::{
    Column, ColumnType, ColumnTypeRegistry, ColumnValue, Kind, NimbusError, RecordId, Result,
    TenantId,
};
use nimbus_queries::{entity_filters, CompositeQueryParameter};
use std::sync::Arc;

/// Datastore-backed [`EventStorage`].
///
/// Event type, producer, and timestamp are denormalized as columns so that
/// the usual event queries (by type, by time range) run natively.
pub struct DsEventStorage {
    kind: Kind,
    wrapper: Arc<DatastoreWrapper>,
    registry: Arc<ColumnTypeRegistry>,
}

impl DsEventStorage {
    pub fn new(
        kind: Kind,
        wrapper: Arc<DatastoreWrapper>,
        registry: Arc<ColumnTypeRegistry>,
    ) -> Self {
        Self {
            kind,
            wrapper,
            registry,
        }
    }

    /// Column holding the event type name.
    pub fn type_column() -> Column {
        Column::new("event_type", ColumnType::String)
    }

    /// Column holding the producing entity's id.
    pub fn producer_column() -> Column {
        Column::new("producer_id", ColumnType::String)
    }

    /// Column holding the event timestamp.
    pub fn created_column() -> Column {
        Column::new("created", ColumnType::Timestamp)
    }

    fn factory(&self, tenant: &TenantId) -> KeyFactory {
        self.wrapper.key_factory(&self.kind, tenant)
    }

    fn to_entity(&self, factory: &KeyFactory, event: &StoredEvent) -> Result<Entity> {
        let key = factory.new_key(RecordId::new(event.event_id.clone()));
        let mut entity = Entity::new(key).with(
            RECORD_PROPERTY,
            DsValue::Str(serde_json::to_string(event)?),
        );
        entity.set(
            Self::type_column().name(),
            self.registry.to_ds_value(
                &Self::type_column(),
                &ColumnValue::String(event.event_type.clone()),
            )?,
        );
        entity.set(
            Self::producer_column().name(),
            self.registry.to_ds_value(
                &Self::producer_column(),
                &ColumnValue::String(event.producer_id.clone()),
            )?,
        );
        entity.set(
            Self::created_column().name(),
            self.registry.to_ds_value(
                &Self::created_column(),
                &ColumnValue::Timestamp(event.timestamp),
            )?,
        );
        Ok(entity)
    }

    fn from_entity(entity: &Entity) -> Result<StoredEvent> {
        match entity.get(RECORD_PROPERTY) {
            Some(DsValue::Str(text)) => Ok(serde_json::from_str(text)?),
            _ => Err(NimbusError::conversion(format!(
                "entity {} has no event envelope",
                entity.key()
            ))),
        }
    }
}

impl Storage for DsEventStorage {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn wrapper(&self) -> &Arc<DatastoreWrapper> {
        &self.wrapper
    }
}

impl EventStorage for DsEventStorage {
    fn write(&self, tenant: &TenantId, event: &StoredEvent) -> Result<()> {
        let factory = self.factory(tenant);
        let entity = self.to_entity(&factory, event)?;
        self.wrapper.create_or_update(&[entity])
    }

    fn read(&self, tenant: &TenantId, event_id: &str) -> Result<Option<StoredEvent>> {
        let key = self.factory(tenant).new_key(RecordId::new(event_id));
        let found = self.wrapper.read(&[key])?;
        found.first().map(Self::from_entity).transpose()
    }

    fn read_all(&self, tenant: &TenantId) -> Result<Vec<StoredEvent>> {
        self.wrapper
            .read_all(&self.kind, tenant)?
            .iter()
            .map(Self::from_entity)
            .collect()
    }

    fn read_by_query(
        &self,
        tenant: &TenantId,
        params: &[CompositeQueryParameter],
    ) -> Result<Vec<StoredEvent>> {
        let filters = entity_filters(params, &self.registry)?;
        self.wrapper
            .read_filtered(&self.kind, tenant, &filters)?
            .iter()
            .map(Self::from_entity)
            .collect()
    }
}
