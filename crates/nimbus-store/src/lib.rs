//! Datastore-backed storage adapter for event-sourced applications.
//!
//! This crate binds the framework-facing storage contracts (records,
//! aggregates, events, commands, projections) to Google Cloud Datastore
//! semantics: kinds, namespaced keys, property-bag entities, batched
//! mutations, and AND-only native filters.
//!
//! # Architecture
//!
//! ```text
//! DatastoreStorageFactory
//!     ├── DsRecordStorage / DsAggregateStorage / DsEventStorage /
//!     │   DsCommandStorage / DsProjectionStorage   (traits.rs contracts)
//!     ├── DatastoreWrapper      chunking, transactions, namespaces
//!     └── ColumnTypeRegistry    column value <-> DsValue conversions
//!                 │
//!          DatastoreClient      the wire seam (in-memory impl for tests)
//! ```
//!
//! Storages convert records to entities, hand them to the shared
//! [`DatastoreWrapper`], and express column predicates through
//! [`nimbus_queries`], whose normalization turns arbitrary AND/OR
//! compositions into the AND-only filters the backend accepts. The wrapper
//! runs one query per filter and unions the results.
//!
//! The real GCP client binding lives in the hosting application; this crate
//! ships [`test_utils::InMemoryDatastore`], a faithful in-memory
//! [`DatastoreClient`] that enforces the same per-call ceilings.

pub mod client;
pub mod factory;
pub mod records;
pub mod storages;
pub mod test_utils;
pub mod traits;
pub mod wrapper;

pub use client::{DatastoreClient, TxId, MAX_KEYS_PER_LOOKUP, MAX_MUTATIONS_PER_CALL};
pub use factory::DatastoreStorageFactory;
pub use records::{
    AggregateEventRecord, AggregateRecordKind, CommandRecord, CommandStatus, EntityRecord,
    EntityRecordWithColumns, StoredEvent, RECORD_PROPERTY,
};
pub use storages::{
    DsAggregateStorage, DsCommandStorage, DsEventStorage, DsProjectionStorage, DsRecordStorage,
};
pub use traits::{
    AggregateStorage, CommandStorage, EventStorage, ProjectionStorage, RecordStorage, Storage,
};
pub use wrapper::DatastoreWrapper;
