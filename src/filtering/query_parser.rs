//! Turns a raw query string into sort and filter conditions.
//!
//! ```text
//! ?sort=-price&sort=name&name__like=lap&id__in=1,2,3&page=2
//! ```
//!
//! `sort` entries become [`SortCondition`]s (`-` prefix for descending).
//! Every other key of the shape `field__operator` with a known operator
//! becomes a [`FilterCondition`]. Unrecognised keys are ignored here; the
//! whitelist decides what survives.

use url::form_urlencoded;

use super::conditions::{FilterCondition, FilterOperator, FilterValue, Scalar};
use super::sort::{SortCondition, default_sort};

/// Keys that never become filters.
pub const RESERVED_KEYS: [&str; 3] = ["page", "pageSize", "sort"];

const OPERATOR_SEPARATOR: &str = "__";

/// A query-string value: one occurrence or a repeated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First occurrence of a repeated key.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first().map(String::as_str),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            Self::One(first) => *self = Self::Many(vec![std::mem::take(first), value]),
            Self::Many(values) => values.push(value),
        }
    }
}

/// Decoded query parameters in first-appearance order, repeated keys grouped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    /// Decode an `application/x-www-form-urlencoded` query string.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::default();
        for (key, value) in iter {
            let key = key.into();
            let value = value.into();
            match params.entries.iter_mut().find(|(name, _)| *name == key) {
                Some((_, existing)) => existing.push(value),
                None => params.entries.push((key, QueryValue::One(value))),
            }
        }
        params
    }
}

/// Parse the `sort` parameter. Absent or blank yields `createdAt desc`.
#[must_use]
pub fn parse_sort_params(sort: Option<&QueryValue>) -> Vec<SortCondition> {
    let sorts: Vec<SortCondition> = sort
        .into_iter()
        .flat_map(QueryValue::iter)
        .filter_map(|entry| match entry.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(SortCondition::desc(field)),
            Some(_) => None,
            None if entry.is_empty() => None,
            None => Some(SortCondition::asc(entry)),
        })
        .collect();

    if sorts.is_empty() { default_sort() } else { sorts }
}

/// Parse every `field__operator=value` pair, skipping reserved keys,
/// malformed keys and unknown operators.
#[must_use]
pub fn parse_filter_params(params: &QueryParams) -> Vec<FilterCondition> {
    params
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(key))
        .filter_map(|(key, value)| {
            let (field, operator) = split_filter_key(key)?;
            let raw = value.first()?;
            let value = if operator.takes_list() {
                FilterValue::List(coerce_list(raw))
            } else {
                FilterValue::Scalar(coerce_scalar(raw))
            };
            Some(FilterCondition {
                field: field.to_string(),
                operator,
                value,
            })
        })
        .collect()
}

#[must_use]
pub fn parse_sort_and_filter_params(params: &QueryParams) -> (Vec<SortCondition>, Vec<FilterCondition>) {
    (parse_sort_params(params.get("sort")), parse_filter_params(params))
}

/// `price__gte` → `("price", Gte)`. Exactly one separator is allowed.
fn split_filter_key(key: &str) -> Option<(&str, FilterOperator)> {
    let mut parts = key.split(OPERATOR_SEPARATOR);
    let field = parts.next()?;
    let tag = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    FilterOperator::parse(tag).map(|operator| (field, operator))
}

fn coerce_list(raw: &str) -> Vec<Scalar> {
    raw.split(',')
        .map(str::trim)
        .map(|item| parse_number(item).unwrap_or_else(|| Scalar::Text(item.to_string())))
        .collect()
}

fn coerce_scalar(raw: &str) -> Scalar {
    if let Some(number) = parse_number(raw) {
        return number;
    }
    match raw {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => Scalar::Text(raw.to_string()),
    }
}

/// Finite decimal numbers. Integral values become `Int`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn parse_number(raw: &str) -> Option<Scalar> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Scalar::Int(int));
    }
    // f64 parsing also accepts "inf" and "NaN"; only plain numerals count.
    if !trimmed.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.')) {
        return None;
    }
    let float = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(Scalar::Int(float as i64))
    } else {
        Some(Scalar::Float(float))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::sort::SortDirection;

    fn params(query: &str) -> QueryParams {
        QueryParams::from_query_string(query)
    }

    #[test]
    fn test_repeated_keys_are_grouped_in_order() {
        let params = params("sort=-price&name__eq=a&sort=name&name__eq=b");
        assert_eq!(
            params.get("sort"),
            Some(&QueryValue::Many(vec!["-price".into(), "name".into()]))
        );
        assert_eq!(params.get("name__eq").and_then(QueryValue::first), Some("a"));
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["sort", "name__eq"]);
    }

    #[test]
    fn test_sort_parsing() {
        let sorts = parse_sort_params(params("sort=-price&sort=name").get("sort"));
        assert_eq!(sorts, vec![SortCondition::desc("price"), SortCondition::asc("name")]);
    }

    #[test]
    fn test_sort_defaults_when_absent_or_blank() {
        assert_eq!(parse_sort_params(None), default_sort());
        assert_eq!(parse_sort_params(params("sort=").get("sort")), default_sort());
        assert_eq!(parse_sort_params(params("sort=-").get("sort")), default_sort());
    }

    #[test]
    fn test_every_sort_entry_yields_one_condition() {
        for fields in [vec!["a"], vec!["a", "-b"], vec!["-a", "b", "-c", "d"]] {
            let query: Vec<String> = fields.iter().map(|f| format!("sort={f}")).collect();
            let sorts = parse_sort_params(params(&query.join("&")).get("sort"));
            assert_eq!(sorts.len(), fields.len());
            for (sort, raw) in sorts.iter().zip(&fields) {
                let expected = if raw.starts_with('-') {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                assert_eq!(sort.direction, expected);
                assert_eq!(sort.field, raw.trim_start_matches('-'));
            }
        }
    }

    #[test]
    fn test_filter_parsing_and_coercion() {
        let filters = parse_filter_params(&params(
            "price__gte=100&name__like=lap&active__eq=true&id__in=1,%202,x&rating__lt=4.5",
        ));
        assert_eq!(
            filters,
            vec![
                FilterCondition::new("price", FilterOperator::Gte, Scalar::Int(100)),
                FilterCondition::new("name", FilterOperator::Like, Scalar::Text("lap".into())),
                FilterCondition::new("active", FilterOperator::Eq, Scalar::Bool(true)),
                FilterCondition::new(
                    "id",
                    FilterOperator::In,
                    FilterValue::List(vec![
                        Scalar::Int(1),
                        Scalar::Int(2),
                        Scalar::Text("x".into())
                    ])
                ),
                FilterCondition::new("rating", FilterOperator::Lt, Scalar::Float(4.5)),
            ]
        );
    }

    #[test]
    fn test_reserved_and_malformed_keys_are_skipped() {
        let filters = parse_filter_params(&params(
            "page=2&pageSize=5&sort=name&name=plain&name__between=1&a__b__eq=1&q=x",
        ));
        assert!(filters.is_empty(), "{filters:?}");
    }

    #[test]
    fn test_repeated_filter_key_uses_first_value() {
        let filters = parse_filter_params(&params("quantity__eq=1&quantity__eq=2"));
        assert_eq!(
            filters,
            vec![FilterCondition::new("quantity", FilterOperator::Eq, Scalar::Int(1))]
        );
    }

    #[test]
    fn test_number_coercion_edges() {
        assert_eq!(coerce_scalar("-3"), Scalar::Int(-3));
        assert_eq!(coerce_scalar("+7"), Scalar::Int(7));
        assert_eq!(coerce_scalar("1e3"), Scalar::Int(1000));
        assert_eq!(coerce_scalar(".5"), Scalar::Float(0.5));
        assert_eq!(coerce_scalar("inf"), Scalar::Text("inf".into()));
        assert_eq!(coerce_scalar("NaN"), Scalar::Text("NaN".into()));
        assert_eq!(coerce_scalar(""), Scalar::Text(String::new()));
        assert_eq!(coerce_scalar("True"), Scalar::Text("True".into()));
        assert_eq!(coerce_scalar("12abc"), Scalar::Text("12abc".into()));
    }

    #[test]
    fn test_in_list_elements_are_trimmed() {
        assert_eq!(
            coerce_list(" a , 3 ,b"),
            vec![
                Scalar::Text("a".into()),
                Scalar::Int(3),
                Scalar::Text("b".into())
            ]
        );
    }

    #[test]
    fn test_not_in_is_a_single_operator() {
        let filters = parse_filter_params(&params("id__not_in=4,5"));
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].operator, FilterOperator::NotIn);
    }

    #[test]
    fn test_parse_sort_and_filter_params() {
        let (sorts, filters) = parse_sort_and_filter_params(&params("sort=-id&id__eq=1"));
        assert_eq!(sorts, vec![SortCondition::desc("id")]);
        assert_eq!(filters.len(), 1);
    }
}
