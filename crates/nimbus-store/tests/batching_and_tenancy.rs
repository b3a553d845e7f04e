//! Batch chunking, tenancy isolation, and transactions exercised through
//! the public storage surface.

use nimbus_commons::{EntityId, Kind, NamespaceSupplier, TenantId};
use nimbus_store::test_utils::InMemoryDatastore;
use nimbus_store::{
    DatastoreStorageFactory, EntityRecord, EntityRecordWithColumns, RecordStorage, Storage,
};
use serde_json::json;
use std::sync::Arc;

fn record(version: i32) -> EntityRecordWithColumns {
    EntityRecordWithColumns::without_columns(EntityRecord {
        type_url: "example.Task".into(),
        state: json!({}),
        version,
    })
}

#[test]
fn test_batches_beyond_the_ceilings_are_chunked() -> anyhow::Result<()> {
    // The in-memory client rejects oversized calls outright, so a write of
    // 1200 records only succeeds if the wrapper chunks it.
    let factory = DatastoreStorageFactory::new(
        Arc::new(InMemoryDatastore::new()),
        NamespaceSupplier::single_tenant(),
    );
    let storage = factory.create_record_storage("example.Task")?;
    let tenant = TenantId::Value("acme".into());

    let count = 1200;
    let batch: Vec<(EntityId, EntityRecordWithColumns)> = (0..count)
        .map(|i| (EntityId::Long(i), record(i as i32)))
        .collect();
    storage.write_all(&tenant, &batch)?;

    assert_eq!(storage.read_all(&tenant)?.len(), count as usize);

    // 1200 keys in one logical lookup exceeds the per-call key ceiling too.
    let ids: Vec<EntityId> = (0..count).map(EntityId::Long).collect();
    assert_eq!(storage.read_multiple(&tenant, &ids)?.len(), count as usize);
    Ok(())
}

#[test]
fn test_tenants_are_isolated_in_multitenant_mode() -> anyhow::Result<()> {
    let factory = DatastoreStorageFactory::new(
        Arc::new(InMemoryDatastore::new()),
        NamespaceSupplier::multitenant(),
    );
    let storage = factory.create_record_storage("example.Task")?;
    let alpha = TenantId::Value("alpha".into());
    let beta = TenantId::Value("beta".into());
    let id = EntityId::Text("t-1".into());

    storage.write(&alpha, &id, &record(1))?;
    storage.write(&beta, &id, &record(2))?;

    assert_eq!(storage.read(&alpha, &id)?.unwrap().version, 1);
    assert_eq!(storage.read(&beta, &id)?.unwrap().version, 2);

    // Dropping one tenant's kind leaves the other untouched.
    storage
        .wrapper()
        .drop_table(&Kind::new("example.Task")?, &alpha)?;
    assert!(storage.read(&alpha, &id)?.is_none());
    assert_eq!(storage.read(&beta, &id)?.unwrap().version, 2);
    Ok(())
}

#[test]
fn test_storage_writes_join_the_active_transaction() -> anyhow::Result<()> {
    let factory = DatastoreStorageFactory::new(
        Arc::new(InMemoryDatastore::new()),
        NamespaceSupplier::single_tenant(),
    );
    let storage = factory.create_record_storage("example.Task")?;
    let tenant = TenantId::Value("acme".into());
    let id = EntityId::Text("t-1".into());

    factory.wrapper().start_transaction()?;
    storage.write(&tenant, &id, &record(1))?;
    assert!(storage.read(&tenant, &id)?.is_none());

    factory.wrapper().commit_transaction()?;
    assert_eq!(storage.read(&tenant, &id)?.unwrap().version, 1);
    Ok(())
}
