//! Namespace-aware, transaction-aware, batch-safe wrapper over the
//! Datastore client.
//!
//! One wrapper instance is owned by one storage factory and shared by every
//! storage built from it. It adds three things on top of the raw client:
//!
//! - **chunking**: callers hand over collections of any size; the wrapper
//!   splits them into backend calls that respect the per-call ceilings and
//!   presents a single logical operation;
//! - **transaction state**: a {NoTransaction, TransactionActive} state
//!   machine with at most one active transaction per wrapper and no nesting;
//!   misuse is an illegal-state error, never retried;
//! - **namespace resolution**: key factories and queries are scoped to the
//!   namespace derived for an explicitly passed tenant.
//!
//! The transaction slot is behind a mutex only so the wrapper stays
//! `Send + Sync`; concurrent callers mutating the same wrapper while a
//! transaction is active get no meaningful isolation from it. That usage is
//! undefined and callers needing it must synchronize externally.
//!
//! The wrapper implements no retry or backoff of its own: a failed chunk
//! surfaces the client's error as-is, and timeout policy belongs to the
//! client. Ordering holds within one chunk, but the backend gives no global
//! ordering across chunks; the untransacted read-after-write path is only as
//! consistent as the backend itself.

use crate::client::{DatastoreClient, TxId, MAX_KEYS_PER_LOOKUP, MAX_MUTATIONS_PER_CALL};
use log::debug;
use nimbus_commons::datastore::{Entity, EntityFilter, EntityQuery, Key, KeyFactory};
use nimbus_commons::{Kind, NamespaceSupplier, NimbusError, Result, TenantId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// The adapter's single point of access to Datastore.
pub struct DatastoreWrapper {
    client: Arc<dyn DatastoreClient>,
    namespaces: NamespaceSupplier,
    active_tx: Mutex<Option<TxId>>,
}

impl DatastoreWrapper {
    /// Wraps a client with the given namespace derivation.
    pub fn new(client: Arc<dyn DatastoreClient>, namespaces: NamespaceSupplier) -> Self {
        Self {
            client,
            namespaces,
            active_tx: Mutex::new(None),
        }
    }

    /// The namespace supplier this wrapper resolves tenants through.
    pub fn namespaces(&self) -> &NamespaceSupplier {
        &self.namespaces
    }

    /// A key builder pre-scoped to the namespace derived for `tenant`.
    pub fn key_factory(&self, kind: &Kind, tenant: &TenantId) -> KeyFactory {
        KeyFactory::new(self.namespaces.namespace_for(tenant), kind.clone())
    }

    // --- Transactions ---

    /// Begins a transaction. Fails with illegal-state if one is already
    /// active on this wrapper.
    pub fn start_transaction(&self) -> Result<()> {
        let mut slot = self.active_tx.lock();
        if slot.is_some() {
            return Err(NimbusError::illegal_state(
                "a transaction is already active on this wrapper",
            ));
        }
        *slot = Some(self.client.begin_transaction()?);
        Ok(())
    }

    /// Commits the active transaction. Fails with illegal-state if none is
    /// active. The wrapper returns to NoTransaction even when the commit
    /// itself fails; the error still propagates.
    pub fn commit_transaction(&self) -> Result<()> {
        let tx = self.take_active_tx("commit")?;
        self.client.commit(tx)
    }

    /// Rolls back the active transaction. Fails with illegal-state if none
    /// is active.
    pub fn rollback_transaction(&self) -> Result<()> {
        let tx = self.take_active_tx("rollback")?;
        self.client.rollback(tx)
    }

    /// True while a transaction is active.
    pub fn is_transaction_active(&self) -> bool {
        self.active_tx.lock().is_some()
    }

    fn take_active_tx(&self, action: &str) -> Result<TxId> {
        self.active_tx.lock().take().ok_or_else(|| {
            NimbusError::illegal_state(format!("cannot {}: no active transaction", action))
        })
    }

    fn current_tx(&self) -> Option<TxId> {
        *self.active_tx.lock()
    }

    // --- Batched reads and writes ---

    /// Upserts entities, splitting into backend calls of at most
    /// [`MAX_MUTATIONS_PER_CALL`] each.
    pub fn create_or_update(&self, entities: &[Entity]) -> Result<()> {
        let tx = self.current_tx();
        for chunk in entities.chunks(MAX_MUTATIONS_PER_CALL) {
            self.client.put_all(chunk, tx)?;
        }
        Ok(())
    }

    /// Reads entities by key, splitting into backend calls of at most
    /// [`MAX_KEYS_PER_LOOKUP`] each. Only keys that exist contribute to the
    /// result, so the result length is the count of live keys, not the
    /// input length.
    pub fn read(&self, keys: &[Key]) -> Result<Vec<Entity>> {
        let mut found = Vec::new();
        for chunk in keys.chunks(MAX_KEYS_PER_LOOKUP) {
            found.extend(self.client.lookup(chunk)?);
        }
        Ok(found)
    }

    /// Deletes keys, splitting into backend calls of at most
    /// [`MAX_MUTATIONS_PER_CALL`] each.
    pub fn delete(&self, keys: &[Key]) -> Result<()> {
        let tx = self.current_tx();
        for chunk in keys.chunks(MAX_MUTATIONS_PER_CALL) {
            self.client.delete_all(chunk, tx)?;
        }
        Ok(())
    }

    // --- Queries ---

    /// Reads every entity of a kind in the tenant's namespace.
    pub fn read_all(&self, kind: &Kind, tenant: &TenantId) -> Result<Vec<Entity>> {
        let namespace = self.namespaces.namespace_for(tenant);
        self.client
            .run_query(&EntityQuery::all(namespace, kind.clone()))
    }

    /// Runs one query per filter and unions the result sets, deduplicating
    /// by key — the client-side OR over the DNF produced by the query layer.
    ///
    /// An empty `filters` slice means "no predicate" here and reads the
    /// whole kind; callers wanting "match nothing" simply skip the call.
    pub fn read_filtered(
        &self,
        kind: &Kind,
        tenant: &TenantId,
        filters: &[EntityFilter],
    ) -> Result<Vec<Entity>> {
        if filters.is_empty() {
            return self.read_all(kind, tenant);
        }
        let namespace = self.namespaces.namespace_for(tenant);
        let mut seen: HashSet<Key> = HashSet::new();
        let mut union = Vec::new();
        for filter in filters {
            let query = EntityQuery::filtered(namespace.clone(), kind.clone(), filter.clone());
            for entity in self.client.run_query(&query)? {
                if seen.insert(entity.key().clone()) {
                    union.push(entity);
                }
            }
        }
        Ok(union)
    }

    // --- Maintenance ---

    /// Deletes every entity of a kind in the tenant's namespace. Test and
    /// maintenance use only; not part of the production read/write path.
    pub fn drop_table(&self, kind: &Kind, tenant: &TenantId) -> Result<()> {
        let namespace = self.namespaces.namespace_for(tenant);
        let keys = self
            .client
            .run_key_query(&EntityQuery::all(namespace, kind.clone()))?;
        debug!("dropping {} entities of kind '{}'", keys.len(), kind);
        self.delete(&keys)
    }

    /// Deletes every entity of every kind in the tenant's namespace.
    pub fn drop_all_tables(&self, tenant: &TenantId) -> Result<()> {
        let namespace = self.namespaces.namespace_for(tenant);
        for kind in self.client.kinds(&namespace)? {
            self.drop_table(&kind, tenant)?;
        }
        Ok(())
    }
}
