use sea_orm::{ColumnTrait, Condition, sea_query::Order};

use super::conditions::{FilterCondition, build_filter_condition};
use super::pagination::PaginationParams;
use super::query_parser::{QueryParams, parse_sort_and_filter_params};
use super::sort::{SortCondition, build_sort_orders};
use super::whitelist::{FilterField, validate_filters, validate_sorts};
use crate::errors::{ApiError, QueryError};

/// What a list or count query should select and in which order.
///
/// `scope` is an extra predicate ANDed with the filters, used by nested
/// routes such as "products of one category".
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub filters: Vec<FilterCondition>,
    pub sorts: Vec<SortCondition>,
    pub scope: Option<Condition>,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Vec<FilterCondition>) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_sorts(mut self, sorts: Vec<SortCondition>) -> Self {
        self.sorts = sorts;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Condition) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Filters ANDed with the scope.
    ///
    /// # Errors
    ///
    /// See [`build_filter_condition`].
    pub fn condition<C>(&self, fields: &[FilterField<C>]) -> Result<Condition, QueryError>
    where
        C: ColumnTrait + Copy,
    {
        let condition = build_filter_condition(&self.filters, fields)?;
        Ok(match &self.scope {
            Some(scope) => condition.add(scope.clone()),
            None => condition,
        })
    }

    /// # Errors
    ///
    /// See [`build_sort_orders`].
    pub fn orders<C>(&self, columns: &[(&str, C)], default_column: C) -> Result<Vec<(C, Order)>, QueryError>
    where
        C: ColumnTrait + Copy,
    {
        build_sort_orders(&self.sorts, columns, default_column)
    }
}

/// A list request as read from the query string: pagination plus the
/// whitelisted filters and sorts.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub pagination: PaginationParams,
    pub options: QueryOptions,
}

impl ListQuery {
    /// # Errors
    ///
    /// [`ApiError::ValidationFailed`] when `page` or `pageSize` is present but
    /// not an integer. Unknown filters and sorts are dropped, not rejected.
    pub fn from_params<C>(
        params: &QueryParams,
        filterable: &[FilterField<C>],
        sortable: &[(&str, C)],
    ) -> Result<Self, ApiError> {
        let mut errors = Vec::new();
        let page = read_integer(params, "page", &mut errors);
        let page_size = read_integer(params, "pageSize", &mut errors);
        if !errors.is_empty() {
            return Err(ApiError::validation_failed(errors));
        }

        let (sorts, filters) = parse_sort_and_filter_params(params);
        Ok(Self {
            pagination: PaginationParams { page, page_size },
            options: QueryOptions::new()
                .with_filters(validate_filters(filters, filterable))
                .with_sorts(validate_sorts(sorts, sortable)),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_integer(params: &QueryParams, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    let raw = params.get(key)?.first()?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Some(value as i64),
        _ => {
            errors.push(format!("{key} must be an integer"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::conditions::{FilterOperator, Scalar};
    use crate::filtering::whitelist::{FieldKind, ID_OPERATORS};

    const SORTABLE: &[(&str, u8)] = &[("id", 0), ("createdAt", 1)];

    fn filterable() -> Vec<FilterField<u8>> {
        vec![FilterField::new("id", 0, FieldKind::Integer, ID_OPERATORS)]
    }

    fn list(query: &str) -> Result<ListQuery, ApiError> {
        ListQuery::from_params(&QueryParams::from_query_string(query), &filterable(), SORTABLE)
    }

    #[test]
    fn test_list_query_applies_whitelist() {
        let query = list("page=2&pageSize=5&id__in=1,2&id__gt=3&secret__eq=x&sort=-id&sort=password")
            .unwrap();
        assert_eq!(query.pagination, PaginationParams::new(2, 5));
        assert_eq!(query.options.filters.len(), 1);
        assert_eq!(query.options.filters[0].operator, FilterOperator::In);
        assert_eq!(query.options.sorts, vec![SortCondition::desc("id")]);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = list("").unwrap();
        assert_eq!(query.pagination, PaginationParams::default());
        assert!(query.options.filters.is_empty());
        assert_eq!(query.options.sorts, vec![SortCondition::desc("createdAt")]);
    }

    #[test]
    fn test_non_integer_page_is_rejected() {
        let err = list("page=abc&pageSize=2.5").unwrap_err();
        let ApiError::ValidationFailed { errors } = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors, vec!["page must be an integer", "pageSize must be an integer"]);
    }

    #[test]
    fn test_integral_float_and_blank_pages() {
        let query = list("page=3.0&pageSize=").unwrap();
        assert_eq!(query.pagination.page, Some(3));
        assert_eq!(query.pagination.page_size, None);
    }

    #[test]
    fn test_out_of_range_page_is_clamped_not_rejected() {
        let query = list("page=-4&pageSize=1000").unwrap();
        let page = query.pagination.normalize();
        assert_eq!((page.page, page.page_size), (1, 100));
    }

    #[test]
    fn test_builders() {
        let options = QueryOptions::new()
            .with_filters(vec![FilterCondition::new("id", FilterOperator::Eq, Scalar::Int(1))])
            .with_sorts(vec![SortCondition::asc("id")])
            .with_scope(Condition::all());
        assert_eq!(options.filters.len(), 1);
        assert_eq!(options.sorts.len(), 1);
        assert!(options.scope.is_some());
    }
}
