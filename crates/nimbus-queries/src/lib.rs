//! # nimbus-queries
//!
//! Query-filter normalization for the nimbus Cloud Datastore adapter.
//!
//! The hosting framework composes column predicates into groups joined by
//! AND or OR; Datastore executes only flat AND-filters. This crate rewrites
//! the composite form into Disjunctive Normal Form and emits one
//! AND-only [`EntityFilter`](nimbus_commons::EntityFilter) per conjunctive
//! clause. Running one query per filter and unioning the results reproduces
//! the original predicate.
//!
//! ## Example
//!
//! ```
//! use nimbus_commons::{Column, ColumnType, ColumnTypeRegistry, ColumnValue};
//! use nimbus_queries::{entity_filters, ColumnPredicate, CompositeQueryParameter};
//!
//! let status = Column::new("status", ColumnType::String);
//! let owner = Column::new("owner", ColumnType::String);
//!
//! // owner = "alice" AND (status = "open" OR status = "blocked")
//! let params = vec![
//!     CompositeQueryParameter::all(vec![ColumnPredicate::eq(
//!         owner,
//!         ColumnValue::String("alice".into()),
//!     )])
//!     .unwrap(),
//!     CompositeQueryParameter::either(vec![
//!         ColumnPredicate::eq(status.clone(), ColumnValue::String("open".into())),
//!         ColumnPredicate::eq(status, ColumnValue::String("blocked".into())),
//!     ])
//!     .unwrap(),
//! ];
//!
//! let filters = entity_filters(&params, &ColumnTypeRegistry::default()).unwrap();
//! // One query per disjunct.
//! assert_eq!(filters.len(), 2);
//! ```

pub mod dnf;
pub mod params;
pub mod predicate;

pub use dnf::entity_filters;
pub use params::{CompositeQueryParameter, GroupingOperator};
pub use predicate::{ColumnPredicate, ComparisonOperator};
