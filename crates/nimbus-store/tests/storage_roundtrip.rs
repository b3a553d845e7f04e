//! End-to-end round trips through the storage contracts, backed by the
//! in-memory client.

use chrono::{TimeZone, Utc};
use nimbus_commons::{Column, ColumnType, ColumnValue, EntityId, NamespaceSupplier, TenantId};
use nimbus_queries::{ColumnPredicate, CompositeQueryParameter};
use nimbus_store::test_utils::InMemoryDatastore;
use nimbus_store::{
    AggregateEventRecord, AggregateRecordKind, AggregateStorage, CommandRecord, CommandStatus,
    CommandStorage, DatastoreStorageFactory, EntityRecord, EntityRecordWithColumns, EventStorage,
    ProjectionStorage, RecordStorage, StoredEvent,
};
use serde_json::json;
use std::sync::Arc;

fn factory() -> DatastoreStorageFactory {
    DatastoreStorageFactory::new(
        Arc::new(InMemoryDatastore::new()),
        NamespaceSupplier::single_tenant(),
    )
}

fn tenant() -> TenantId {
    TenantId::Value("acme".into())
}

fn task_record(title: &str, version: i32) -> EntityRecord {
    EntityRecord {
        type_url: "example.Task".into(),
        state: json!({ "title": title }),
        version,
    }
}

fn status_column() -> Column {
    Column::new("task_status", ColumnType::String)
}

fn owner_column() -> Column {
    Column::new("owner", ColumnType::String)
}

fn task_with_columns(title: &str, owner: &str, status: &str) -> EntityRecordWithColumns {
    EntityRecordWithColumns {
        record: task_record(title, 1),
        columns: vec![
            (owner_column(), ColumnValue::String(owner.into())),
            (status_column(), ColumnValue::String(status.into())),
        ],
    }
}

#[test]
fn test_record_write_read_delete() -> anyhow::Result<()> {
    let storage = factory().create_record_storage("example.Task")?;
    let tenant = tenant();
    let id = EntityId::Text("t-1".into());

    assert!(storage.read(&tenant, &id)?.is_none());

    let record = task_with_columns("write tests", "carol", "OPEN");
    storage.write(&tenant, &id, &record)?;
    assert_eq!(storage.read(&tenant, &id)?, Some(record.record.clone()));

    assert!(storage.delete(&tenant, &id)?);
    assert!(!storage.delete(&tenant, &id)?);
    assert!(storage.read(&tenant, &id)?.is_none());
    Ok(())
}

#[test]
fn test_record_ids_of_every_shape_round_trip() -> anyhow::Result<()> {
    let storage = factory().create_record_storage("example.Task")?;
    let tenant = tenant();
    let ids = [
        EntityId::Int(7),
        EntityId::Long(-3_000_000_000),
        EntityId::Text("t-1".into()),
        EntityId::Structured(json!({ "region": "eu", "seq": 4 })),
    ];

    for (n, id) in ids.iter().enumerate() {
        storage.write(
            &tenant,
            id,
            &EntityRecordWithColumns::without_columns(task_record("task", n as i32)),
        )?;
    }
    for (n, id) in ids.iter().enumerate() {
        let read = storage.read(&tenant, id)?.unwrap();
        assert_eq!(read.version, n as i32);
    }
    Ok(())
}

#[test]
fn test_read_multiple_skips_missing_ids() -> anyhow::Result<()> {
    let storage = factory().create_record_storage("example.Task")?;
    let tenant = tenant();
    storage.write(
        &tenant,
        &EntityId::Text("t-1".into()),
        &EntityRecordWithColumns::without_columns(task_record("one", 1)),
    )?;

    let found = storage.read_multiple(
        &tenant,
        &[EntityId::Text("t-1".into()), EntityId::Text("missing".into())],
    )?;
    assert_eq!(found.len(), 1);
    Ok(())
}

#[test]
fn test_query_with_disjunction_unions_matches() -> anyhow::Result<()> {
    let storage = factory().create_record_storage("example.Task")?;
    let tenant = tenant();

    storage.write(
        &tenant,
        &EntityId::Text("t-1".into()),
        &task_with_columns("one", "carol", "OPEN"),
    )?;
    storage.write(
        &tenant,
        &EntityId::Text("t-2".into()),
        &task_with_columns("two", "carol", "BLOCKED"),
    )?;
    storage.write(
        &tenant,
        &EntityId::Text("t-3".into()),
        &task_with_columns("three", "carol", "DONE"),
    )?;
    storage.write(
        &tenant,
        &EntityId::Text("t-4".into()),
        &task_with_columns("four", "dave", "OPEN"),
    )?;

    // owner == carol AND (status == OPEN OR status == BLOCKED)
    let params = [
        CompositeQueryParameter::all(vec![ColumnPredicate::eq(
            owner_column(),
            ColumnValue::String("carol".into()),
        )])?,
        CompositeQueryParameter::either(vec![
            ColumnPredicate::eq(status_column(), ColumnValue::String("OPEN".into())),
            ColumnPredicate::eq(status_column(), ColumnValue::String("BLOCKED".into())),
        ])?,
    ];

    let mut titles: Vec<String> = storage
        .read_by_query(&tenant, &params)?
        .into_iter()
        .map(|r| r.state["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, ["one", "two"]);
    Ok(())
}

#[test]
fn test_empty_query_reads_everything() -> anyhow::Result<()> {
    let storage = factory().create_record_storage("example.Task")?;
    let tenant = tenant();
    storage.write(
        &tenant,
        &EntityId::Text("t-1".into()),
        &EntityRecordWithColumns::without_columns(task_record("one", 1)),
    )?;
    assert_eq!(storage.read_by_query(&tenant, &[])?.len(), 1);
    Ok(())
}

#[test]
fn test_aggregate_history_is_newest_first() -> anyhow::Result<()> {
    let storage = factory().create_aggregate_storage("example.Order")?;
    let tenant = tenant();
    let id = EntityId::Text("order-1".into());

    for version in 1..=3 {
        storage.write_record(
            &tenant,
            &id,
            &AggregateEventRecord {
                record_kind: AggregateRecordKind::Event,
                payload: json!({ "event": format!("e{}", version) }),
                version,
                timestamp: Utc.timestamp_millis_opt(1_000 * version as i64).unwrap(),
            },
        )?;
    }
    storage.write_record(
        &tenant,
        &id,
        &AggregateEventRecord {
            record_kind: AggregateRecordKind::Snapshot,
            payload: json!({ "state": "snapshotted" }),
            version: 4,
            timestamp: Utc.timestamp_millis_opt(4_000).unwrap(),
        },
    )?;
    // A second aggregate must not leak into the history.
    storage.write_record(
        &tenant,
        &EntityId::Text("order-2".into()),
        &AggregateEventRecord {
            record_kind: AggregateRecordKind::Event,
            payload: json!({}),
            version: 1,
            timestamp: Utc.timestamp_millis_opt(0).unwrap(),
        },
    )?;

    let history = storage.read_history(&tenant, &id)?;
    let versions: Vec<i32> = history.iter().map(|r| r.version).collect();
    assert_eq!(versions, [4, 3, 2, 1]);
    assert_eq!(history[0].record_kind, AggregateRecordKind::Snapshot);
    Ok(())
}

#[test]
fn test_events_query_by_type() -> anyhow::Result<()> {
    let storage = factory().create_event_storage("example.TaskEvent")?;
    let tenant = tenant();

    for (id, event_type) in [
        ("e-1", "example.TaskCreated"),
        ("e-2", "example.TaskCompleted"),
        ("e-3", "example.TaskCreated"),
    ] {
        storage.write(
            &tenant,
            &StoredEvent {
                event_id: id.into(),
                event_type: event_type.into(),
                producer_id: "task-1".into(),
                payload: json!({}),
                timestamp: Utc::now(),
            },
        )?;
    }

    assert_eq!(storage.read_all(&tenant)?.len(), 3);
    assert_eq!(storage.read(&tenant, "e-2")?.unwrap().event_id, "e-2");

    let by_type = CompositeQueryParameter::all(vec![ColumnPredicate::eq(
        nimbus_store::DsEventStorage::type_column(),
        ColumnValue::String("example.TaskCreated".into()),
    )])?;
    assert_eq!(storage.read_by_query(&tenant, &[by_type])?.len(), 2);
    Ok(())
}

#[test]
fn test_commands_read_by_status() -> anyhow::Result<()> {
    let storage = factory().create_command_storage("example.Command")?;
    let tenant = tenant();

    for (id, status) in [
        ("c-1", CommandStatus::Received),
        ("c-2", CommandStatus::Ok),
        ("c-3", CommandStatus::Received),
        ("c-4", CommandStatus::Error),
    ] {
        storage.write(
            &tenant,
            &CommandRecord {
                command_id: id.into(),
                command_type: "example.CreateTask".into(),
                payload: json!({}),
                status,
                timestamp: Utc::now(),
            },
        )?;
    }

    let received = storage.read_by_status(&tenant, CommandStatus::Received)?;
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|c| c.status == CommandStatus::Received));
    assert!(storage.read(&tenant, "c-4")?.unwrap().status == CommandStatus::Error);
    Ok(())
}

#[test]
fn test_projection_tracks_last_handled_event_time() -> anyhow::Result<()> {
    let storage = factory().create_projection_storage("example.TaskView")?;
    let tenant = tenant();

    assert!(storage.read_last_handled_event_time(&tenant)?.is_none());

    // Sub-millisecond precision does not survive storage.
    let precise = Utc.timestamp_opt(1_500_000_000, 123_456_789).unwrap();
    storage.write_last_handled_event_time(&tenant, precise)?;

    let read = storage.read_last_handled_event_time(&tenant)?.unwrap();
    assert_eq!(read.timestamp_millis(), precise.timestamp_millis());
    assert_ne!(read, precise);

    // Projection records still behave as plain record storage.
    let id = EntityId::Text("view-1".into());
    storage.write(
        &tenant,
        &id,
        &EntityRecordWithColumns::without_columns(task_record("view", 1)),
    )?;
    assert!(storage.read(&tenant, &id)?.is_some());
    Ok(())
}

#[test]
fn test_projection_bookkeeping_does_not_pollute_records() -> anyhow::Result<()> {
    let storage = factory().create_projection_storage("example.TaskView")?;
    let tenant = tenant();

    storage.write_last_handled_event_time(&tenant, Utc::now())?;
    assert!(storage.read_all(&tenant)?.is_empty());
    Ok(())
}
