//! Record storage: entity records with queryable columns.

use crate::records::{EntityRecord, EntityRecordWithColumns, RECORD_PROPERTY};
use crate::traits::{RecordStorage, Storage};
use crate::wrapper::DatastoreWrapper;
use nimbus_commons::datastore::{DsValue, Entity, KeyFactory};
use nimbus_commons::{
    ColumnTypeRegistry, EntityId, Kind, NimbusError, Result, TenantId,
};
use nimbus_queries::{entity_filters, CompositeQueryParameter};
use std::sync::Arc;

/// Datastore-backed [`RecordStorage`].
///
/// One instance per record type; the type's fully qualified name is the
/// kind. The serialized record envelope is stored under the reserved
/// `record` property and each declared column becomes a named property via
/// the column-type registry.
pub struct DsRecordStorage {
    kind: Kind,
    wrapper: Arc<DatastoreWrapper>,
    registry: Arc<ColumnTypeRegistry>,
}

impl std::fmt::Debug for DsRecordStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DsRecordStorage")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl DsRecordStorage {
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

    pub(crate) fn registry(&self) -> &Arc<ColumnTypeRegistry> {
        &self.registry
    }

    fn factory(&self, tenant: &TenantId) -> KeyFactory {
        self.wrapper.key_factory(&self.kind, tenant)
    }

    fn to_entity(
        &self,
        factory: &KeyFactory,
        id: &EntityId,
        record: &EntityRecordWithColumns,
    ) -> Result<Entity> {
        record.validate()?;
        let key = factory.new_key(id.to_record_id()?);
        let mut entity = Entity::new(key).with(
            RECORD_PROPERTY,
            DsValue::Str(serde_json::to_string(&record.record)?),
        );
        for (column, value) in &record.columns {
            entity.set(column.name(), self.registry.to_ds_value(column, value)?);
        }
        Ok(entity)
    }

    pub(crate) fn record_from_entity(entity: &Entity) -> Result<EntityRecord> {
        match entity.get(RECORD_PROPERTY) {
            Some(DsValue::Str(text)) => Ok(serde_json::from_str(text)?),
            Some(other) => Err(NimbusError::conversion(format!(
                "entity {} stores a non-string record envelope: {}",
                entity.key(),
                other
            ))),
            None => Err(NimbusError::conversion(format!(
                "entity {} has no record envelope",
                entity.key()
            ))),
        }
    }
}

impl Storage for DsRecordStorage {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn wrapper(&self) -> &Arc<DatastoreWrapper> {
        &self.wrapper
    }
}

impl RecordStorage for DsRecordStorage {
    fn write(
        &self,
        tenant: &TenantId,
        id: &EntityId,
        record: &EntityRecordWithColumns,
    ) -> Result<()> {
        self.write_all(tenant, &[(id.clone(), record.clone())])
    }

    fn write_all(
        &self,
        tenant: &TenantId,
        records: &[(EntityId, EntityRecordWithColumns)],
    ) -> Result<()> {
        let factory = self.factory(tenant);
        let entities = records
            .iter()
            .map(|(id, record)| self.to_entity(&factory, id, record))
            .collect::<Result<Vec<Entity>>>()?;
        self.wrapper.create_or_update(&entities)
    }

    fn read(&self, tenant: &TenantId, id: &EntityId) -> Result<Option<EntityRecord>> {
        let key = self.factory(tenant).new_key(id.to_record_id()?);
        let found = self.wrapper.read(&[key])?;
        found
            .first()
            .map(Self::record_from_entity)
            .transpose()
    }

    fn read_multiple(&self, tenant: &TenantId, ids: &[EntityId]) -> Result<Vec<EntityRecord>> {
        let factory = self.factory(tenant);
        let keys = ids
            .iter()
            .map(|id| Ok(factory.new_key(id.to_record_id()?)))
            .collect::<Result<Vec<_>>>()?;
        self.wrapper
            .read(&keys)?
            .iter()
            .map(Self::record_from_entity)
            .collect()
    }

    fn read_all(&self, tenant: &TenantId) -> Result<Vec<EntityRecord>> {
        self.wrapper
            .read_all(&self.kind, tenant)?
            .iter()
            .map(Self::record_from_entity)
            .collect()
    }

    fn read_by_query(
        &self,
        tenant: &TenantId,
        params: &[CompositeQueryParameter],
    ) -> Result<Vec<EntityRecord>> {
        // An empty predicate normalizes to no filters, which the wrapper
        // treats as "read the whole kind".
        let filters = entity_filters(params, &self.registry)?;
        self.wrapper
            .read_filtered(&self.kind, tenant, &filters)?
            .iter()
            .map(Self::record_from_entity)
            .collect()
    }

    fn delete(&self, tenant: &TenantId, id: &EntityId) -> Result<bool> {
        let key = self.factory(tenant).new_key(id.to_record_id()?);
        let exists = !self.wrapper.read(std::slice::from_ref(&key))?.is_empty();
        if exists {
            self.wrapper.delete(&[key])?;
        }
        Ok(exists)
    }
}
