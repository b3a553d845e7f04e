//! Composite query parameters: predicate groups with one fixed Boolean
//! operator.
//!
//! A query arrives as a collection of groups. Groups are always implicitly
//! AND-ed with each other; inside a group the predicates are joined by the
//! group's own operator, fixed at construction:
//!
//! - `All` — every predicate must hold (AND);
//! - `Either` — at least one predicate must hold (OR).

use crate::predicate::ColumnPredicate;
use nimbus_commons::{NimbusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The Boolean operator joining predicates inside one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingOperator {
    All,
    Either,
}

impl fmt::Display for GroupingOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingOperator::All => write!(f, "ALL"),
            GroupingOperator::Either => write!(f, "EITHER"),
        }
    }
}

/// A non-empty group of column predicates with a fixed internal operator.
///
/// Duplicate predicates inside a group collapse at construction; the
/// operator never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeQueryParameter {
    operator: GroupingOperator,
    predicates: Vec<ColumnPredicate>,
}

impl CompositeQueryParameter {
    /// A conjunctive (AND) group.
    pub fn all(predicates: Vec<ColumnPredicate>) -> Result<Self> {
        Self::from_parts(GroupingOperator::All, predicates)
    }

    /// A disjunctive (OR) group.
    pub fn either(predicates: Vec<ColumnPredicate>) -> Result<Self> {
        Self::from_parts(GroupingOperator::Either, predicates)
    }

    fn from_parts(operator: GroupingOperator, predicates: Vec<ColumnPredicate>) -> Result<Self> {
        if predicates.is_empty() {
            return Err(NimbusError::invalid_argument(format!(
                "a composite query parameter must contain at least one predicate ({})",
                operator
            )));
        }
        let mut deduplicated: Vec<ColumnPredicate> = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            if !deduplicated.contains(&predicate) {
                deduplicated.push(predicate);
            }
        }
        Ok(Self {
            operator,
            predicates: deduplicated,
        })
    }

    pub fn operator(&self) -> GroupingOperator {
        self.operator
    }

    pub fn predicates(&self) -> &[ColumnPredicate] {
        &self.predicates
    }

    /// True for `All` groups.
    pub fn is_conjunctive(&self) -> bool {
        self.operator == GroupingOperator::All
    }

    /// Merges two conjunctive groups into one. Commutative and associative,
    /// so the merge order across many groups does not affect the result.
    pub fn conjunct(&self, other: &CompositeQueryParameter) -> Result<Self> {
        if !self.is_conjunctive() || !other.is_conjunctive() {
            return Err(NimbusError::invalid_argument(
                "only ALL groups can be merged by conjunction",
            ));
        }
        let mut merged = self.predicates.clone();
        merged.extend(other.predicates.iter().cloned());
        Self::from_parts(GroupingOperator::All, merged)
    }
}

impl fmt::Display for CompositeQueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator)?;
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", predicate)?;
        }
        write!(f, ")")
    }
}
