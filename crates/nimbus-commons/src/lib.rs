//! # nimbus-commons
//!
//! Shared models for the nimbus Cloud Datastore adapter: error types, kind
//! and key identity, tenancy and namespace derivation, the framework column
//! model, Datastore-native value/entity/filter shapes, and the column-type
//! registry that converts between the two value worlds.
//!
//! ## Architecture
//!
//! ```text
//! nimbus-store   (wrapper, storages, factory)
//!     ↓
//! nimbus-queries (filter normalization)
//!     ↓
//! nimbus-commons (this crate: identity, columns, native model, conversion)
//! ```

pub mod column;
pub mod datastore;
pub mod errors;
pub mod kind;
pub mod record_id;
pub mod registry;
pub mod tenant;

pub use column::{Column, ColumnType, ColumnValue};
pub use datastore::{DsValue, Entity, EntityFilter, EntityQuery, Key, KeyFactory, NativeOp, PropertyFilter};
pub use errors::{NimbusError, Result};
pub use kind::{Kind, RESERVED_KIND_PREFIX};
pub use record_id::{EntityId, IdKind, RecordId};
pub use registry::{ColumnTypeMapping, ColumnTypeRegistry};
pub use tenant::{Namespace, NamespaceSupplier, TenantId};
