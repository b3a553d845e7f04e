//! Datastore keys and the namespace-scoped key factory.

use crate::kind::Kind;
use crate::record_id::RecordId;
use crate::tenant::Namespace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The unit of identity for all backend operations:
/// namespace + kind + record id.
///
/// Keys are created on write and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    namespace: Namespace,
    kind: Kind,
    record_id: RecordId,
}

impl Key {
    /// Assembles a key from its parts.
    pub fn new(namespace: Namespace, kind: Kind, record_id: RecordId) -> Self {
        Self {
            namespace,
            kind,
            record_id,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]{}/{}",
            self.namespace, self.kind, self.record_id
        )
    }
}

/// Builds keys of one kind within one namespace.
///
/// Obtained from the wrapper pre-scoped to the namespace resolved for a
/// tenant, so storage code only supplies record ids.
#[derive(Debug, Clone)]
pub struct KeyFactory {
    namespace: Namespace,
    kind: Kind,
}

impl KeyFactory {
    /// Creates a factory scoped to the given namespace and kind.
    pub fn new(namespace: Namespace, kind: Kind) -> Self {
        Self { namespace, kind }
    }

    /// Builds a key for the given record id.
    pub fn new_key(&self, record_id: RecordId) -> Key {
        Key::new(self.namespace.clone(), self.kind.clone(), record_id)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }
}
