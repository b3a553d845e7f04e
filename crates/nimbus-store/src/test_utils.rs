//! Test utilities for nimbus-store.
//!
//! [`InMemoryDatastore`] is an explicit in-process stand-in for the real
//! backend with the same observable contract: per-call batch ceilings,
//! buffered transactions, namespace isolation, and AND-only query
//! evaluation. It is an ordinary value with no global state; each test
//! constructs and drops its own instance.
//!
//! Unlike the real backend it is strongly consistent, so tests read their
//! writes immediately.

use crate::client::{DatastoreClient, TxId, MAX_KEYS_PER_LOOKUP, MAX_MUTATIONS_PER_CALL};
use dashmap::DashMap;
use nimbus_commons::datastore::{Entity, EntityQuery, Key};
use nimbus_commons::{Kind, Namespace, NimbusError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

enum Mutation {
    Upsert(Entity),
    Delete(Key),
}

/// In-memory [`DatastoreClient`] implementation.
///
/// Batch ceilings are enforced hard: a call exceeding them fails with a
/// backend error. That is deliberate — it is how tests prove the wrapper
/// chunks oversized batches instead of passing them through.
#[derive(Default)]
pub struct InMemoryDatastore {
    entities: DashMap<Key, Entity>,
    pending: Mutex<HashMap<TxId, Vec<Mutation>>>,
    next_tx: AtomicU64,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored (committed) entities across all namespaces.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn apply(&self, mutation: Mutation) {
        match mutation {
            Mutation::Upsert(entity) => {
                self.entities.insert(entity.key().clone(), entity);
            }
            Mutation::Delete(key) => {
                self.entities.remove(&key);
            }
        }
    }

    fn buffer_or_apply(&self, tx: Option<TxId>, mutations: Vec<Mutation>) -> Result<()> {
        match tx {
            Some(tx) => {
                let mut pending = self.pending.lock();
                let buffer = pending.get_mut(&tx).ok_or_else(|| {
                    NimbusError::backend(format!("unknown transaction: {}", tx))
                })?;
                buffer.extend(mutations);
            }
            None => {
                for mutation in mutations {
                    self.apply(mutation);
                }
            }
        }
        Ok(())
    }
}

impl DatastoreClient for InMemoryDatastore {
    fn put_all(&self, entities: &[Entity], tx: Option<TxId>) -> Result<()> {
        if entities.len() > MAX_MUTATIONS_PER_CALL {
            return Err(NimbusError::backend(format!(
                "too many mutations in one call: {} (max {})",
                entities.len(),
                MAX_MUTATIONS_PER_CALL
            )));
        }
        let mutations = entities
            .iter()
            .map(|e| Mutation::Upsert(e.clone()))
            .collect();
        self.buffer_or_apply(tx, mutations)
    }

    fn lookup(&self, keys: &[Key]) -> Result<Vec<Entity>> {
        if keys.len() > MAX_KEYS_PER_LOOKUP {
            return Err(NimbusError::backend(format!(
                "too many keys in one lookup: {} (max {})",
                keys.len(),
                MAX_KEYS_PER_LOOKUP
            )));
        }
        Ok(keys
            .iter()
            .filter_map(|key| self.entities.get(key).map(|e| e.value().clone()))
            .collect())
    }

    fn delete_all(&self, keys: &[Key], tx: Option<TxId>) -> Result<()> {
        if keys.len() > MAX_MUTATIONS_PER_CALL {
            return Err(NimbusError::backend(format!(
                "too many mutations in one call: {} (max {})",
                keys.len(),
                MAX_MUTATIONS_PER_CALL
            )));
        }
        let mutations = keys.iter().map(|k| Mutation::Delete(k.clone())).collect();
        self.buffer_or_apply(tx, mutations)
    }

    fn run_query(&self, query: &EntityQuery) -> Result<Vec<Entity>> {
        let mut matched: Vec<Entity> = self
            .entities
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        // DashMap iteration order is arbitrary; keep results stable for
        // assertions.
        matched.sort_by(|a, b| a.key().record_id().cmp(b.key().record_id()));
        Ok(matched)
    }

    fn run_key_query(&self, query: &EntityQuery) -> Result<Vec<Key>> {
        Ok(self
            .run_query(query)?
            .into_iter()
            .map(|entity| entity.key().clone())
            .collect())
    }

    fn kinds(&self, namespace: &Namespace) -> Result<Vec<Kind>> {
        let mut kinds: Vec<Kind> = self
            .entities
            .iter()
            .filter(|entry| entry.key().namespace() == namespace)
            .map(|entry| entry.key().kind().clone())
            .collect();
        kinds.sort();
        kinds.dedup();
        Ok(kinds)
    }

    fn begin_transaction(&self) -> Result<TxId> {
        let tx = self.next_tx.fetch_add(1, Ordering::Relaxed) + 1;
        self.pending.lock().insert(tx, Vec::new());
        Ok(tx)
    }

    fn commit(&self, tx: TxId) -> Result<()> {
        let mutations = self
            .pending
            .lock()
            .remove(&tx)
            .ok_or_else(|| NimbusError::backend(format!("unknown transaction: {}", tx)))?;
        for mutation in mutations {
            self.apply(mutation);
        }
        Ok(())
    }

    fn rollback(&self, tx: TxId) -> Result<()> {
        self.pending
            .lock()
            .remove(&tx)
            .ok_or_else(|| NimbusError::backend(format!("unknown transaction: {}", tx)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_commons::datastore::{DsValue, EntityFilter, NativeOp, PropertyFilter};
    use nimbus_commons::RecordId;

    fn key(ns: &str, kind: &str, id: &str) -> Key {
        Key::new(
            Namespace::new(ns).unwrap(),
            Kind::new(kind).unwrap(),
            RecordId::new(id),
        )
    }

    #[test]
    fn test_lookup_returns_only_existing_keys() {
        let store = InMemoryDatastore::new();
        let k1 = key("", "example.Task", "t-1");
        store
            .put_all(&[Entity::new(k1.clone())], None)
            .unwrap();

        let found = store
            .lookup(&[k1, key("", "example.Task", "missing")])
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_oversized_batches_are_rejected() {
        let store = InMemoryDatastore::new();
        let entities: Vec<Entity> = (0..=MAX_MUTATIONS_PER_CALL)
            .map(|i| Entity::new(key("", "example.Task", &format!("t-{}", i))))
            .collect();
        assert!(matches!(
            store.put_all(&entities, None).unwrap_err(),
            NimbusError::Backend(_)
        ));

        let keys: Vec<Key> = (0..=MAX_KEYS_PER_LOOKUP)
            .map(|i| key("", "example.Task", &format!("t-{}", i)))
            .collect();
        assert!(matches!(
            store.lookup(&keys).unwrap_err(),
            NimbusError::Backend(_)
        ));
    }

    #[test]
    fn test_queries_respect_namespace_isolation() {
        let store = InMemoryDatastore::new();
        store
            .put_all(
                &[
                    Entity::new(key("VtenantA", "example.Task", "t-1")),
                    Entity::new(key("VtenantB", "example.Task", "t-1")),
                ],
                None,
            )
            .unwrap();

        let query = EntityQuery::all(
            Namespace::new("VtenantA").unwrap(),
            Kind::new("example.Task").unwrap(),
        );
        assert_eq!(store.run_query(&query).unwrap().len(), 1);
    }

    #[test]
    fn test_filtered_query() {
        let store = InMemoryDatastore::new();
        store
            .put_all(
                &[
                    Entity::new(key("", "example.Task", "t-1"))
                        .with("priority", DsValue::Integer(1)),
                    Entity::new(key("", "example.Task", "t-2"))
                        .with("priority", DsValue::Integer(5)),
                ],
                None,
            )
            .unwrap();

        let filter = EntityFilter::new(PropertyFilter::new(
            "priority",
            NativeOp::GreaterThan,
            DsValue::Integer(2),
        ));
        let query = EntityQuery::filtered(
            Namespace::default_namespace(),
            Kind::new("example.Task").unwrap(),
            filter,
        );
        let matched = store.run_query(&query).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].key().record_id().as_str(), "t-2");
    }

    #[test]
    fn test_unknown_transaction_is_backend_error() {
        let store = InMemoryDatastore::new();
        assert!(matches!(
            store.commit(99).unwrap_err(),
            NimbusError::Backend(_)
        ));
    }
}
