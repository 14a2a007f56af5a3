use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, Condition, Value,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::whitelist::{FieldKind, FilterField};
use crate::errors::QueryError;

/// Comparison operator of a `field__operator=value` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    NotIn,
}

impl FilterOperator {
    pub const ALL: [Self; 9] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Like,
        Self::In,
        Self::NotIn,
    ];

    /// Parse an operator tag as it appears after `__` in a query key.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == tag)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }

    /// Set-membership operators take a list value.
    #[must_use]
    pub const fn takes_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single coerced query value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Build one predicate out of a list of filter conditions.
///
/// Conditions are ANDed in order. An empty list yields `Condition::all()`
/// with no members, which sea-query renders as no `WHERE` clause at all.
///
/// # Errors
///
/// - [`QueryError::InvalidFilterField`] when a field has no column in `fields`
/// - [`QueryError::InvalidFilterValue`] when `in`/`not_in` get a scalar, a
///   comparison gets a list, or a value cannot be bound to the column's type
pub fn build_filter_condition<C>(
    filters: &[FilterCondition],
    fields: &[FilterField<C>],
) -> Result<Condition, QueryError>
where
    C: ColumnTrait + Copy,
{
    filters.iter().try_fold(Condition::all(), |condition, filter| {
        let field = fields
            .iter()
            .find(|field| field.name == filter.field)
            .ok_or_else(|| QueryError::InvalidFilterField(filter.field.clone()))?;
        Ok(condition.add(build_expression(filter, field)?))
    })
}

fn build_expression<C>(filter: &FilterCondition, field: &FilterField<C>) -> Result<SimpleExpr, QueryError>
where
    C: ColumnTrait + Copy,
{
    let column = field.column;
    match &filter.value {
        FilterValue::List(items) if filter.operator.takes_list() => {
            let values = items
                .iter()
                .map(|item| bind_value(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if filter.operator == FilterOperator::In {
                column.is_in(values)
            } else {
                column.is_not_in(values)
            })
        }
        FilterValue::Scalar(_) if filter.operator.takes_list() => Err(QueryError::invalid_value(
            field.name,
            format!("'{}' operator requires an array value", filter.operator),
        )),
        FilterValue::List(_) => Err(QueryError::invalid_value(
            field.name,
            format!("'{}' operator requires a single value", filter.operator),
        )),
        FilterValue::Scalar(value) if filter.operator == FilterOperator::Like => {
            Ok(build_like_condition(column, &value.to_string()))
        }
        FilterValue::Scalar(value) => {
            let bound = bind_value(field, value)?;
            Ok(match filter.operator {
                FilterOperator::Ne => column.ne(bound),
                FilterOperator::Gt => column.gt(bound),
                FilterOperator::Gte => column.gte(bound),
                FilterOperator::Lt => column.lt(bound),
                FilterOperator::Lte => column.lte(bound),
                _ => column.eq(bound),
            })
        }
    }
}

/// Case-insensitive substring match, `UPPER(col) LIKE '%VALUE%'`.
#[must_use]
pub fn build_like_condition<C: ColumnTrait>(column: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::upper(Expr::col(column))).like(format!("%{}%", value.to_uppercase()))
}

/// Convert a coerced scalar into a value of the column's type.
fn bind_value<C>(field: &FilterField<C>, value: &Scalar) -> Result<Value, QueryError> {
    match (field.kind, value) {
        (FieldKind::Text, value) => Ok(value.to_string().into()),
        (FieldKind::Integer, Scalar::Int(v)) => Ok((*v).into()),
        (FieldKind::Integer, Scalar::Float(v)) => Ok((*v).into()),
        (FieldKind::Boolean, Scalar::Bool(v)) => Ok((*v).into()),
        (FieldKind::Timestamp, Scalar::Text(v)) => parse_timestamp(v)
            .map(Value::from)
            .ok_or_else(|| QueryError::invalid_value(field.name, format!("'{v}' is not a valid date"))),
        (kind, value) => Err(QueryError::invalid_value(
            field.name,
            format!("'{value}' is not a valid {kind} value"),
        )),
    }
}

/// RFC 3339 timestamps, or a bare `YYYY-MM-DD` read as midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    mod widget {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "widgets")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub name: String,
            pub active: bool,
            pub created_at: DateTimeUtc,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    use widget::{Column, Entity};

    const ALL_OPS: &[FilterOperator] = &FilterOperator::ALL;

    fn fields() -> Vec<FilterField<Column>> {
        vec![
            FilterField::new("id", Column::Id, FieldKind::Integer, ALL_OPS),
            FilterField::new("name", Column::Name, FieldKind::Text, ALL_OPS),
            FilterField::new("active", Column::Active, FieldKind::Boolean, ALL_OPS),
            FilterField::new("createdAt", Column::CreatedAt, FieldKind::Timestamp, ALL_OPS),
        ]
    }

    fn sql(filters: &[FilterCondition]) -> String {
        let condition = build_filter_condition(filters, &fields()).unwrap();
        Entity::find().filter(condition).build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn test_operator_tags_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(FilterOperator::parse(op.as_str()), Some(op));
        }
        assert_eq!(FilterOperator::parse("between"), None);
        assert_eq!(FilterOperator::parse("EQ"), None);
    }

    #[test]
    fn test_empty_filters_are_identity() {
        let query = sql(&[]);
        assert!(!query.contains("WHERE"), "{query}");
    }

    #[test]
    fn test_comparisons_are_anded() {
        let query = sql(&[
            FilterCondition::new("id", FilterOperator::Gte, Scalar::Int(3)),
            FilterCondition::new("active", FilterOperator::Eq, Scalar::Bool(true)),
        ]);
        assert!(query.contains(r#""widgets"."id" >= 3"#), "{query}");
        assert!(query.contains(" AND "), "{query}");
        assert!(query.contains(r#""widgets"."active" = "#), "{query}");
    }

    #[test]
    fn test_like_is_case_insensitive_substring() {
        let query = sql(&[FilterCondition::new(
            "name",
            FilterOperator::Like,
            Scalar::Text("Lap".into()),
        )]);
        assert!(query.contains("UPPER("), "{query}");
        assert!(query.contains("LIKE '%LAP%'"), "{query}");
    }

    #[test]
    fn test_in_and_not_in() {
        let list = FilterValue::List(vec![Scalar::Int(1), Scalar::Int(2)]);
        let query = sql(&[FilterCondition::new("id", FilterOperator::In, list.clone())]);
        assert!(query.contains("IN (1, 2)"), "{query}");
        let query = sql(&[FilterCondition::new("id", FilterOperator::NotIn, list)]);
        assert!(query.contains("NOT IN (1, 2)"), "{query}");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = build_filter_condition(
            &[FilterCondition::new("secret", FilterOperator::Eq, Scalar::Int(1))],
            &fields(),
        )
        .unwrap_err();
        assert_eq!(err, QueryError::InvalidFilterField("secret".into()));
    }

    #[test]
    fn test_in_requires_list() {
        let err = build_filter_condition(
            &[FilterCondition::new("id", FilterOperator::In, Scalar::Int(1))],
            &fields(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilterValue { .. }));
    }

    #[test]
    fn test_comparison_rejects_list() {
        let err = build_filter_condition(
            &[FilterCondition::new(
                "id",
                FilterOperator::Eq,
                FilterValue::List(vec![Scalar::Int(1)]),
            )],
            &fields(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilterValue { .. }));
    }

    #[test]
    fn test_type_mismatch_is_invalid_value() {
        let err = build_filter_condition(
            &[FilterCondition::new("id", FilterOperator::Eq, Scalar::Text("abc".into()))],
            &fields(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilterValue { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_text_field_accepts_numbers() {
        let query = sql(&[FilterCondition::new("name", FilterOperator::Eq, Scalar::Int(42))]);
        assert!(query.contains(r#""widgets"."name" = '42'"#), "{query}");
    }

    #[test]
    fn test_timestamp_parsing() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
        assert_eq!(
            parse_timestamp("2024-05-01").map(|t| t.to_rfc3339()),
            Some("2024-05-01T00:00:00+00:00".to_string())
        );
        assert!(parse_timestamp("yesterday").is_none());
    }
}
