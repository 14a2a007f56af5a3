//! Per-entity field whitelists.
//!
//! A resource declares which fields may be filtered (and with which
//! operators) and which may be sorted. Anything else in a request is
//! silently dropped before it reaches the query builder.

use std::fmt;

use super::conditions::{FilterCondition, FilterOperator};
use super::sort::SortCondition;

/// Storage type of a filterable column, used to bind values correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Boolean,
    Timestamp,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        })
    }
}

/// Identifier columns: equality and set membership.
pub const ID_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::In,
    FilterOperator::NotIn,
];

/// Free-text columns.
pub const TEXT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::Like,
    FilterOperator::In,
    FilterOperator::NotIn,
];

/// Ordered scalars such as prices and timestamps.
pub const RANGE_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::Gt,
    FilterOperator::Gte,
    FilterOperator::Lt,
    FilterOperator::Lte,
];

/// Counts: ranges plus set membership.
pub const QUANTITY_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::Gt,
    FilterOperator::Gte,
    FilterOperator::Lt,
    FilterOperator::Lte,
    FilterOperator::In,
    FilterOperator::NotIn,
];

/// A filterable field: API name, column, storage kind and allowed operators.
#[derive(Debug, Clone, Copy)]
pub struct FilterField<C> {
    pub name: &'static str,
    pub column: C,
    pub kind: FieldKind,
    pub operators: &'static [FilterOperator],
}

impl<C> FilterField<C> {
    pub const fn new(
        name: &'static str,
        column: C,
        kind: FieldKind,
        operators: &'static [FilterOperator],
    ) -> Self {
        Self {
            name,
            column,
            kind,
            operators,
        }
    }

    #[must_use]
    pub fn allows(&self, operator: FilterOperator) -> bool {
        self.operators.contains(&operator)
    }
}

/// Keep only filters on whitelisted fields with an allowed operator.
#[must_use]
pub fn validate_filters<C>(filters: Vec<FilterCondition>, fields: &[FilterField<C>]) -> Vec<FilterCondition> {
    filters
        .into_iter()
        .filter(|filter| {
            let allowed = fields
                .iter()
                .any(|field| field.name == filter.field && field.allows(filter.operator));
            if !allowed {
                tracing::debug!(field = %filter.field, operator = %filter.operator, "dropping filter not in whitelist");
            }
            allowed
        })
        .collect()
}

/// Keep only sorts on whitelisted fields.
#[must_use]
pub fn validate_sorts<C>(sorts: Vec<SortCondition>, fields: &[(&str, C)]) -> Vec<SortCondition> {
    sorts
        .into_iter()
        .filter(|sort| fields.iter().any(|(name, _)| *name == sort.field))
        .collect()
}
