use sea_orm::{ColumnTrait, sea_query::Order};
use serde::{Deserialize, Serialize};

use crate::errors::QueryError;

/// Sort key used when a request names none.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCondition {
    pub field: String,
    pub direction: SortDirection,
}

impl SortCondition {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// `createdAt desc`
#[must_use]
pub fn default_sort() -> Vec<SortCondition> {
    vec![SortCondition::desc(DEFAULT_SORT_FIELD)]
}

/// Resolve sort conditions to `(column, order)` pairs, in precedence order.
///
/// With no conditions the result is `default_column` descending.
///
/// # Errors
///
/// [`QueryError::InvalidSortField`] for a field with no column in `columns`.
pub fn build_sort_orders<C>(
    sorts: &[SortCondition],
    columns: &[(&str, C)],
    default_column: C,
) -> Result<Vec<(C, Order)>, QueryError>
where
    C: ColumnTrait + Copy,
{
    if sorts.is_empty() {
        return Ok(vec![(default_column, Order::Desc)]);
    }
    sorts
        .iter()
        .map(|sort| {
            columns
                .iter()
                .find(|&&(name, _)| name == sort.field)
                .map(|&(_, column)| (column, sort.direction.into()))
                .ok_or_else(|| QueryError::InvalidSortField(sort.field.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "widgets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    const COLUMNS: &[(&str, Column)] = &[
        ("id", Column::Id),
        ("name", Column::Name),
        ("createdAt", Column::CreatedAt),
    ];

    #[test]
    fn test_empty_sorts_use_default_desc() {
        let orders = build_sort_orders(&[], COLUMNS, Column::CreatedAt).unwrap();
        assert_eq!(orders.len(), 1);
        assert!(matches!(orders[0], (Column::CreatedAt, Order::Desc)));
    }

    #[test]
    fn test_orders_keep_precedence() {
        let orders = build_sort_orders(
            &[SortCondition::asc("name"), SortCondition::desc("id")],
            COLUMNS,
            Column::CreatedAt,
        )
        .unwrap();
        assert!(matches!(orders[0], (Column::Name, Order::Asc)));
        assert!(matches!(orders[1], (Column::Id, Order::Desc)));
    }

    #[test]
    fn test_unknown_sort_field() {
        let err = build_sort_orders(&[SortCondition::asc("secret")], COLUMNS, Column::Id).unwrap_err();
        assert_eq!(err, QueryError::InvalidSortField("secret".into()));
    }

    #[test]
    fn test_default_sort_is_created_at_desc() {
        assert_eq!(default_sort(), vec![SortCondition::desc("createdAt")]);
    }
}
