//! Storage factory: the adapter's composition root.
//!
//! One factory owns one [`DatastoreWrapper`] and one
//! [`ColumnTypeRegistry`]; every storage it creates shares both. Storages
//! are cheap to create and carry no per-instance caches, so callers may
//! create them per record type and hold them for the process lifetime.

use crate::client::DatastoreClient;
use crate::storages::{
    DsAggregateStorage, DsCommandStorage, DsEventStorage, DsProjectionStorage, DsRecordStorage,
};
use crate::wrapper::DatastoreWrapper;
use nimbus_commons::{ColumnTypeRegistry, Kind, NamespaceSupplier, Result};
use std::sync::Arc;

/// Creates the Datastore-backed storages for a deployment.
pub struct DatastoreStorageFactory {
    wrapper: Arc<DatastoreWrapper>,
    registry: Arc<ColumnTypeRegistry>,
}

impl DatastoreStorageFactory {
    /// A factory over `client` with the default column-type registry.
    pub fn new(client: Arc<dyn DatastoreClient>, namespaces: NamespaceSupplier) -> Self {
        Self::with_registry(client, namespaces, ColumnTypeRegistry::default())
    }

    /// A factory with a caller-extended column-type registry.
    pub fn with_registry(
        client: Arc<dyn DatastoreClient>,
        namespaces: NamespaceSupplier,
        registry: ColumnTypeRegistry,
    ) -> Self {
        Self {
            wrapper: Arc::new(DatastoreWrapper::new(client, namespaces)),
            registry: Arc::new(registry),
        }
    }

    /// The wrapper shared by every storage from this factory.
    pub fn wrapper(&self) -> &Arc<DatastoreWrapper> {
        &self.wrapper
    }

    /// The column-type registry shared by every storage from this factory.
    pub fn registry(&self) -> &Arc<ColumnTypeRegistry> {
        &self.registry
    }

    /// Record storage for the type whose fully qualified name is
    /// `type_name`. Fails with invalid-argument if the name is not a valid
    /// kind.
    pub fn create_record_storage(&self, type_name: &str) -> Result<DsRecordStorage> {
        Ok(DsRecordStorage::new(
            Kind::new(type_name)?,
            Arc::clone(&self.wrapper),
            Arc::clone(&self.registry),
        ))
    }

    /// Aggregate event-history storage for the given aggregate type.
    pub fn create_aggregate_storage(&self, type_name: &str) -> Result<DsAggregateStorage> {
        Ok(DsAggregateStorage::new(
            Kind::new(type_name)?,
            Arc::clone(&self.wrapper),
            Arc::clone(&self.registry),
        ))
    }

    /// Event storage under the given kind.
    pub fn create_event_storage(&self, type_name: &str) -> Result<DsEventStorage> {
        Ok(DsEventStorage::new(
            Kind::new(type_name)?,
            Arc::clone(&self.wrapper),
            Arc::clone(&self.registry),
        ))
    }

    /// Command storage under the given kind.
    pub fn create_command_storage(&self, type_name: &str) -> Result<DsCommandStorage> {
        Ok(DsCommandStorage::new(
            Kind::new(type_name)?,
            Arc::clone(&self.wrapper),
            Arc::clone(&self.registry),
        ))
    }

    /// Projection storage for the given projection state type.
    pub fn create_projection_storage(&self, type_name: &str) -> Result<DsProjectionStorage> {
        Ok(DsProjectionStorage::new(self.create_record_storage(type_name)?))
    }
}
