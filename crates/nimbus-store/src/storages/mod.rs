//! Datastore-backed implementations of the storage contracts.
//!
//! One struct per contract in [`crate::traits`]; all of them speak to the
//! backend through a shared [`crate::wrapper::DatastoreWrapper`] and convert
//! column values through a shared
//! [`nimbus_commons::ColumnTypeRegistry`].

pub mod aggregate_storage;
pub mod command_storage;
pub mod event_storage;
pub mod projection_storage;
pub mod record_storage;

pub use aggregate_storage::DsAggregateStorage;
pub use command_storage::DsCommandStorage;
pub use event_storage::DsEventStorage;
pub use projection_storage::{DsProjectionStorage, EVENT_TIME_KIND};
pub use record_storage::DsRecordStorage;
