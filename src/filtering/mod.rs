//! # Query layer
//!
//! Translates list requests into Sea-ORM conditions, shared by every
//! resource.
//!
//! ```text
//! GET /products?name__like=lap&price__gte=100&sort=-price&page=2&pageSize=20
//! ```
//!
//! - [`query_parser`] decodes the query string into sort and filter conditions
//! - [`whitelist`] drops fields and operators a resource does not expose
//! - [`conditions`] and [`sort`] build the `WHERE` and `ORDER BY` parts
//! - [`pagination`] clamps page requests and computes page metadata
//! - [`options`] bundles the above into [`QueryOptions`] and [`ListQuery`]
//!
//! Filter keys are `field__operator`, with operators `eq`, `ne`, `gt`,
//! `gte`, `lt`, `lte`, `like`, `in` and `not_in`. `in`/`not_in` take a
//! comma-separated list. `sort` may be repeated; a leading `-` sorts
//! descending.

pub mod conditions;
pub mod options;
pub mod pagination;
pub mod query_parser;
pub mod sort;
pub mod whitelist;

pub use conditions::{FilterCondition, FilterOperator, FilterValue, Scalar, build_filter_condition};
pub use options::{ListQuery, QueryOptions};
pub use pagination::{
    MAX_OFFSET, MAX_PAGE_SIZE, PaginatedData, PaginationMeta, PaginationParams, compute_meta,
};
pub use query_parser::{QueryParams, parse_filter_params, parse_sort_and_filter_params, parse_sort_params};
pub use sort::{SortCondition, SortDirection, build_sort_orders, default_sort};
pub use whitelist::{FieldKind, FilterField, validate_filters, validate_sorts};
