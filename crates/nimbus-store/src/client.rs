//! The Datastore client seam.
//!
//! Everything network-shaped lives behind [`DatastoreClient`]: the real GCP
//! client binding implements it in the hosting application, and
//! [`crate::test_utils::InMemoryDatastore`] implements it for tests. The
//! wrapper above this trait owns chunking and transaction-state policy; the
//! client owns the wire, per-call limits, serialization, and retry/backoff.
//! Client failures propagate unchanged as backend errors — nothing in this
//! workspace catches and retries them.

use nimbus_commons::datastore::{Entity, EntityQuery, Key};
use nimbus_commons::{Kind, Namespace, Result};

/// Opaque identifier of a server-side transaction.
pub type TxId = u64;

/// Upper bound on mutations (upserts or deletes) per commit call.
pub const MAX_MUTATIONS_PER_CALL: usize = 500;

/// Upper bound on keys per lookup call.
pub const MAX_KEYS_PER_LOOKUP: usize = 1000;

/// Synchronous connection handle to Datastore.
///
/// All calls block until the backend answers; no call suspends internally.
/// Implementations must be `Send + Sync`; per-call batch ceilings
/// ([`MAX_MUTATIONS_PER_CALL`], [`MAX_KEYS_PER_LOOKUP`]) are enforced here,
/// not above — callers that need larger logical batches go through the
/// wrapper, which chunks for them.
pub trait DatastoreClient: Send + Sync {
    /// Upserts a batch of entities, optionally inside an active transaction.
    fn put_all(&self, entities: &[Entity], tx: Option<TxId>) -> Result<()>;

    /// Looks up entities by key. Keys that do not exist are simply absent
    /// from the result; the order of found entities follows the key order.
    fn lookup(&self, keys: &[Key]) -> Result<Vec<Entity>>;

    /// Deletes a batch of keys, optionally inside an active transaction.
    /// Deleting a missing key is not an error.
    fn delete_all(&self, keys: &[Key], tx: Option<TxId>) -> Result<()>;

    /// Runs a single-kind query and returns the matching entities.
    fn run_query(&self, query: &EntityQuery) -> Result<Vec<Entity>>;

    /// Keys-only variant of [`DatastoreClient::run_query`].
    fn run_key_query(&self, query: &EntityQuery) -> Result<Vec<Key>>;

    /// Lists the kinds that currently hold entities in a namespace.
    fn kinds(&self, namespace: &Namespace) -> Result<Vec<Kind>>;

    /// Begins a server-side transaction.
    fn begin_transaction(&self) -> Result<TxId>;

    /// Commits a transaction, applying its buffered mutations.
    fn commit(&self, tx: TxId) -> Result<()>;

    /// Rolls a transaction back, discarding its buffered mutations.
    fn rollback(&self, tx: TxId) -> Result<()>;
}
