//! Datastore-native filters and queries.
//!
//! Datastore executes a single flat conjunction per query: AND of
//! per-property equality/range clauses. OR does not exist natively — the
//! query layer expresses it by running one query per conjunctive clause and
//! unioning the results client-side.

use crate::datastore::entity::Entity;
use crate::datastore::value::DsValue;
use crate::kind::Kind;
use crate::tenant::Namespace;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The property-filter operators Datastore executes natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeOp {
    Equal,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl fmt::Display for NativeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            NativeOp::Equal => "=",
            NativeOp::GreaterThan => ">",
            NativeOp::GreaterOrEqual => ">=",
            NativeOp::LessThan => "<",
            NativeOp::LessOrEqual => "<=",
        };
        write!(f, "{}", symbol)
    }
}

/// One `property <op> value` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    property: String,
    op: NativeOp,
    value: DsValue,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, op: NativeOp, value: DsValue) -> Self {
        Self {
            property: property.into(),
            op,
            value,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn op(&self) -> NativeOp {
        self.op
    }

    pub fn value(&self) -> &DsValue {
        &self.value
    }

    /// Evaluates this clause against an entity. A missing or
    /// incomparable property never matches.
    pub fn matches(&self, entity: &Entity) -> bool {
        let Some(stored) = entity.get(&self.property) else {
            return false;
        };
        if self.op == NativeOp::Equal {
            return stored == &self.value;
        }
        match stored.compare(&self.value) {
            Some(ordering) => match self.op {
                NativeOp::Equal => ordering == Ordering::Equal,
                NativeOp::GreaterThan => ordering == Ordering::Greater,
                NativeOp::GreaterOrEqual => ordering != Ordering::Less,
                NativeOp::LessThan => ordering == Ordering::Less,
                NativeOp::LessOrEqual => ordering != Ordering::Greater,
            },
            None => false,
        }
    }
}

impl fmt::Display for PropertyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.property, self.op, self.value)
    }
}

/// An immutable AND-only conjunction of property filters — the filter shape
/// a single Datastore query can execute.
///
/// Built fold-style: the first clause seeds the filter, each further clause
/// is conjoined with [`EntityFilter::and`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFilter {
    clauses: Vec<PropertyFilter>,
}

impl EntityFilter {
    /// Seeds a filter with its first clause.
    pub fn new(first: PropertyFilter) -> Self {
        Self {
            clauses: vec![first],
        }
    }

    /// Returns a new filter with one more conjoined clause.
    pub fn and(mut self, clause: PropertyFilter) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[PropertyFilter] {
        &self.clauses
    }

    /// Evaluates the whole conjunction against an entity.
    pub fn matches(&self, entity: &Entity) -> bool {
        self.clauses.iter().all(|clause| clause.matches(entity))
    }
}

impl fmt::Display for EntityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for clause in &self.clauses {
            if !first {
                write!(f, " AND ")?;
            }
            write!(f, "{}", clause)?;
            first = false;
        }
        Ok(())
    }
}

/// A query over one kind in one namespace, with an optional native filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityQuery {
    namespace: Namespace,
    kind: Kind,
    filter: Option<EntityFilter>,
}

impl EntityQuery {
    /// A query matching every entity of the kind.
    pub fn all(namespace: Namespace, kind: Kind) -> Self {
        Self {
            namespace,
            kind,
            filter: None,
        }
    }

    /// A query constrained by a native conjunctive filter.
    pub fn filtered(namespace: Namespace, kind: Kind, filter: EntityFilter) -> Self {
        Self {
            namespace,
            kind,
            filter: Some(filter),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn filter(&self) -> Option<&EntityFilter> {
        self.filter.as_ref()
    }

    /// Evaluates kind, namespace, and filter against an entity.
    pub fn matches(&self, entity: &Entity) -> bool {
        entity.key().namespace() == &self.namespace
            && entity.key().kind() == &self.kind
            && self.filter.as_ref().map_or(true, |f| f.matches(entity))
    }
}
