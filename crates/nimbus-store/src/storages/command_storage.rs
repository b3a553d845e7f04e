//! Command storage: commands keyed by command id, queryable by status.

use crate::records::{CommandRecord, CommandStatus, RECORD_PROPERTY};
use crate::traits::{CommandStorage, Storage};
use crate::wrapper::DatastoreWrapper;
use nimbus_commons::datastore::{DsValue, Entity, KeyFactory};
use nimbus_commons::{
    Column, ColumnType, ColumnTypeRegistry, ColumnValue, Kind, NimbusError, RecordId, Result,
    TenantId,
};
use nimbus_queries::{entity_filters, ColumnPredicate, CompositeQueryParameter};
use std::sync::Arc;

/// Datastore-backed [`CommandStorage`].
pub struct DsCommandStorage {
    kind: Kind,
    wrapper: Arc<DatastoreWrapper>,
    registry: Arc<ColumnTypeRegistry>,
}

impl DsCommandStorage {
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

    /// Column holding the command's processing status.
    pub fn status_column() -> Column {
        Column::new("status", ColumnType::String)
    }

    /// Column holding the command timestamp.
    pub fn created_column() -> Column {
        Column::new("created", ColumnType::Timestamp)
    }

    fn factory(&self, tenant: &TenantId) -> KeyFactory {
        self.wrapper.key_factory(&self.kind, tenant)
    }

    fn to_entity(&self, factory: &KeyFactory, command: &CommandRecord) -> Result<Entity> {
        let key = factory.new_key(RecordId::new(command.command_id.clone()));
        let mut entity = Entity::new(key).with(
            RECORD_PROPERTY,
            DsValue::Str(serde_json::to_string(command)?),
        );
        entity.set(
            Self::status_column().name(),
            self.registry.to_ds_value(
                &Self::status_column(),
                &ColumnValue::String(command.status.as_str().to_string()),
            )?,
        );
        entity.set(
            Self::created_column().name(),
            self.registry.to_ds_value(
                &Self::created_column(),
                &ColumnValue::Timestamp(command.timestamp),
            )?,
        );
        Ok(entity)
    }

    fn from_entity(entity: &Entity) -> Result<CommandRecord> {
        match entity.get(RECORD_PROPERTY) {
            Some(DsValue::Str(text)) => Ok(serde_json::from_str(text)?),
            _ => Err(NimbusError::conversion(format!(
                "entity {} has no command envelope",
                entity.key()
            ))),
        }
    }
}

impl Storage for DsCommandStorage {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn wrapper(&self) -> &Arc<DatastoreWrapper> {
        &self.wrapper
    }
}

impl CommandStorage for DsCommandStorage {
    fn write(&self, tenant: &TenantId, command: &CommandRecord) -> Result<()> {
        let factory = self.factory(tenant);
        let entity = self.to_entity(&factory, command)?;
        self.wrapper.create_or_update(&[entity])
    }

    fn read(&self, tenant: &TenantId, command_id: &str) -> Result<Option<CommandRecord>> {
        let key = self.factory(tenant).new_key(RecordId::new(command_id));
        let found = self.wrapper.read(&[key])?;
        found.first().map(Self::from_entity).transpose()
    }

    fn read_by_status(
        &self,
        tenant: &TenantId,
        status: CommandStatus,
    ) -> Result<Vec<CommandRecord>> {
        let by_status = CompositeQueryParameter::all(vec![ColumnPredicate::eq(
            Self::status_column(),
            ColumnValue::String(status.as_str().to_string()),
        )])?;
        let filters = entity_filters(&[by_status], &self.registry)?;
        self.wrapper
            .read_filtered(&self.kind, tenant, &filters)?
            .iter()
            .map(Self::from_entity)
            .collect()
    }
}
