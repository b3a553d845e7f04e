//! Normalization of composite query parameters into Datastore-native
//! filters.
//!
//! Datastore executes only flat AND-filters, so an arbitrary Boolean
//! combination of column predicates has to be rewritten into Disjunctive
//! Normal Form: a set of conjunctions whose union is equivalent to the
//! original predicate. The caller then runs one query per emitted
//! [`EntityFilter`] and unions the result sets — that union IS the OR.
//!
//! ## Algorithm
//!
//! The input is a collection of groups, implicitly AND-ed with each other,
//! where each group is internally AND (`All`) or OR (`Either`):
//!
//! 1. partition the groups into conjunctive and disjunctive;
//! 2. merge every conjunctive group into a single deduplicated predicate
//!    list — conjunction is commutative and associative, so merge order is
//!    irrelevant;
//! 3. take the Cartesian product across the disjunctive groups' predicate
//!    sets: each combination picks exactly one predicate from each `Either`
//!    group, prefixed by the constant conjunctive predicates;
//! 4. convert every combination into one `EntityFilter`, folding its
//!    predicates together with AND (the first clause seeds the filter).
//!
//! For N disjunctive groups of sizes k1..kN the output holds exactly
//! k1 x k2 x ... x kN filters; with no disjunctive groups it is a single
//! filter, and an empty input produces no filters at all. An empty result
//! carries no claim of "match everything" or "match nothing" — that
//! interpretation belongs to the call site.

use crate::params::CompositeQueryParameter;
use crate::predicate::ColumnPredicate;
use nimbus_commons::datastore::{EntityFilter, PropertyFilter};
use nimbus_commons::{ColumnTypeRegistry, NimbusError, Result};

/// Converts composite query parameters into the list of AND-only filters
/// whose union reproduces the original predicate.
///
/// Predicate values are converted to their stored shapes through `registry`;
/// an unsupported operator or an unconvertible value fails the whole call
/// rather than dropping a clause.
pub fn entity_filters(
    params: &[CompositeQueryParameter],
    registry: &ColumnTypeRegistry,
) -> Result<Vec<EntityFilter>> {
    if params.is_empty() {
        return Ok(Vec::new());
    }

    let (conjunctive, disjunctive): (Vec<_>, Vec<_>) =
        params.iter().partition(|group| group.is_conjunctive());

    // The constant prefix shared by every emitted conjunction.
    let mut constant: Vec<&ColumnPredicate> = Vec::new();
    for group in &conjunctive {
        for predicate in group.predicates() {
            if !constant.contains(&predicate) {
                constant.push(predicate);
            }
        }
    }

    // Cartesian-product fold: each pass multiplies the current set of
    // partial conjunctions by one Either group.
    let mut conjunctions: Vec<Vec<&ColumnPredicate>> = vec![constant];
    for group in &disjunctive {
        let mut expanded = Vec::with_capacity(conjunctions.len() * group.predicates().len());
        for partial in &conjunctions {
            for predicate in group.predicates() {
                let mut conjunction = partial.clone();
                if !conjunction.contains(&predicate) {
                    conjunction.push(predicate);
                }
                expanded.push(conjunction);
            }
        }
        conjunctions = expanded;
    }

    conjunctions
        .into_iter()
        .map(|conjunction| to_entity_filter(&conjunction, registry))
        .collect()
}

/// Folds one conjunction of predicates into a native filter.
fn to_entity_filter(
    conjunction: &[&ColumnPredicate],
    registry: &ColumnTypeRegistry,
) -> Result<EntityFilter> {
    let mut clauses = conjunction.iter().map(|p| to_property_filter(p, registry));
    let first = clauses.next().ok_or_else(|| {
        NimbusError::invalid_argument("cannot build a filter from an empty conjunction")
    })??;
    let mut filter = EntityFilter::new(first);
    for clause in clauses {
        filter = filter.and(clause?);
    }
    Ok(filter)
}

fn to_property_filter(
    predicate: &ColumnPredicate,
    registry: &ColumnTypeRegistry,
) -> Result<PropertyFilter> {
    let op = predicate.operator().to_native()?;
    let value = registry.to_ds_value(predicate.column(), predicate.value())?;
    Ok(PropertyFilter::new(predicate.column().name(), op, value))
}
