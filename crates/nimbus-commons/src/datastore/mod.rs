//! Datastore-native model: values, keys, entities, filters, queries.

pub mod entity;
pub mod filter;
pub mod key;
pub mod value;

pub use entity::Entity;
pub use filter::{EntityFilter, EntityQuery, NativeOp, PropertyFilter};
pub use key::{Key, KeyFactory};
pub use value::DsValue;
