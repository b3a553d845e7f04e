//! Aggregate storage: append-only event histories per aggregate.

use crate::records::{AggregateEventRecord, RECORD_PROPERTY};
use crate::traits::{AggregateStorage, Storage};
use crate::wrapper::DatastoreWrapper;
use nimbus_commons::datastore::{DsValue, Entity, KeyFactory};
use nimbus_commons::{
    Column, ColumnType, ColumnTypeRegistry, ColumnValue, EntityId, Kind, NimbusError, RecordId,
    Result, TenantId,
};
use nimbus_queries::{entity_filters, ColumnPredicate, CompositeQueryParameter};
use std::sync::Arc;

/// Datastore-backed [`AggregateStorage`].
///
/// Each history element is its own entity keyed by
/// `{aggregate-record-id}:{version}`, with the owning aggregate id
/// denormalized as a column so that a history read is a single equality
/// query.
pub struct DsAggregateStorage {
    kind: Kind,
    wrapper: Arc<DatastoreWrapper>,
    registry: Arc<ColumnTypeRegistry>,
}

impl DsAggregateStorage {
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

    /// Column holding the owning aggregate's record id.
    pub fn aggregate_id_column() -> Column {
        Column::new("aggregate_id", ColumnType::String)
    }

    /// Column holding the element's version number.
    pub fn version_column() -> Column {
        Column::new("version", ColumnType::Version)
    }

    /// Column holding the element's timestamp.
    pub fn created_column() -> Column {
        Column::new("created", ColumnType::Timestamp)
    }

    fn factory(&self, tenant: &TenantId) -> KeyFactory {
        self.wrapper.key_factory(&self.kind, tenant)
    }

    /// History-element key: `{aggregate_id}:{version}`.
    fn element_id(aggregate_id: &RecordId, version: i32) -> RecordId {
        let mut s = String::with_capacity(aggregate_id.as_str().len() + 12);
        s.push_str(aggregate_id.as_str());
        s.push(':');
        s.push_str(&version.to_string());
        RecordId::new(s)
    }

    fn to_entity(
        &self,
        factory: &KeyFactory,
        aggregate_id: &RecordId,
        record: &AggregateEventRecord,
    ) -> Result<Entity> {
        let key = factory.new_key(Self::element_id(aggregate_id, record.version));
        let mut entity = Entity::new(key).with(
            RECORD_PROPERTY,
            DsValue::Str(serde_json::to_string(record)?),
        );
        entity.set(
            Self::aggregate_id_column().name(),
            self.registry.to_ds_value(
                &Self::aggregate_id_column(),
                &ColumnValue::String(aggregate_id.as_str().to_string()),
            )?,
        );
        entity.set(
            Self::version_column().name(),
            self.registry
                .to_ds_value(&Self::version_column(), &ColumnValue::Version(record.version))?,
        );
        entity.set(
            Self::created_column().name(),
            self.registry.to_ds_value(
                &Self::created_column(),
                &ColumnValue::Timestamp(record.timestamp),
            )?,
        );
        Ok(entity)
    }

    fn from_entity(entity: &Entity) -> Result<AggregateEventRecord> {
        match entity.get(RECORD_PROPERTY) {
            Some(DsValue::Str(text)) => Ok(serde_json::from_str(text)?),
            _ => Err(NimbusError::conversion(format!(
                "entity {} has no aggregate record envelope",
                entity.key()
            ))),
        }
    }
}

impl Storage for DsAggregateStorage {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn wrapper(&self) -> &Arc<DatastoreWrapper> {
        &self.wrapper
    }
}

impl AggregateStorage for DsAggregateStorage {
    fn write_record(
        &self,
        tenant: &TenantId,
        id: &EntityId,
        record: &AggregateEventRecord,
    ) -> Result<()> {
        let factory = self.factory(tenant);
        let entity = self.to_entity(&factory, &id.to_record_id()?, record)?;
        self.wrapper.create_or_update(&[entity])
    }

    fn read_history(
        &self,
        tenant: &TenantId,
        id: &EntityId,
    ) -> Result<Vec<AggregateEventRecord>> {
        let by_aggregate = CompositeQueryParameter::all(vec![ColumnPredicate::eq(
            Self::aggregate_id_column(),
            ColumnValue::String(id.to_record_id()?.into_string()),
        )])?;
        let filters = entity_filters(&[by_aggregate], &self.registry)?;
        let mut history = self
            .wrapper
            .read_filtered(&self.kind, tenant, &filters)?
            .iter()
            .map(Self::from_entity)
            .collect::<Result<Vec<_>>>()?;
        // Newest first; replay stops at the most recent snapshot.
        history.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(history)
    }
}
