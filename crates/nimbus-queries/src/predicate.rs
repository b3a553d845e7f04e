//! Column predicates: one comparison against one column.

use nimbus_commons::datastore::NativeOp;
use nimbus_commons::{Column, ColumnValue, NimbusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators at the framework level.
///
/// All of these are expressible in the hosting framework's query API, but
/// only the equality/range subset has a native Datastore form. `NotEqual`
/// reaching the normalization engine fails fast with invalid-argument rather
/// than silently dropping the clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    NotEqual,
}

impl ComparisonOperator {
    /// Maps to the Datastore-native operator, rejecting operators the
    /// backend cannot execute.
    pub fn to_native(self) -> Result<NativeOp> {
        match self {
            ComparisonOperator::Equal => Ok(NativeOp::Equal),
            ComparisonOperator::GreaterThan => Ok(NativeOp::GreaterThan),
            ComparisonOperator::GreaterOrEqual => Ok(NativeOp::GreaterOrEqual),
            ComparisonOperator::LessThan => Ok(NativeOp::LessThan),
            ComparisonOperator::LessOrEqual => Ok(NativeOp::LessOrEqual),
            ComparisonOperator::NotEqual => Err(NimbusError::invalid_argument(
                "operator '!=' has no native Datastore filter form",
            )),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::NotEqual => "!=",
        };
        write!(f, "{}", symbol)
    }
}

/// One `column <op> value` predicate.
///
/// Equality of predicates is structural (column + operator + value), which
/// is what makes duplicate predicates collapse during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPredicate {
    column: Column,
    operator: ComparisonOperator,
    value: ColumnValue,
}

impl ColumnPredicate {
    pub fn new(column: Column, operator: ComparisonOperator, value: ColumnValue) -> Self {
        Self {
            column,
            operator,
            value,
        }
    }

    pub fn eq(column: Column, value: ColumnValue) -> Self {
        Self::new(column, ComparisonOperator::Equal, value)
    }

    pub fn gt(column: Column, value: ColumnValue) -> Self {
        Self::new(column, ComparisonOperator::GreaterThan, value)
    }

    pub fn ge(column: Column, value: ColumnValue) -> Self {
        Self::new(column, ComparisonOperator::GreaterOrEqual, value)
    }

    pub fn lt(column: Column, value: ColumnValue) -> Self {
        Self::new(column, ComparisonOperator::LessThan, value)
    }

    pub fn le(column: Column, value: ColumnValue) -> Self {
        Self::new(column, ComparisonOperator::LessOrEqual, value)
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn value(&self) -> &ColumnValue {
        &self.value
    }
}

impl fmt::Display for ColumnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.column.name(), self.operator, self.value)
    }
}
