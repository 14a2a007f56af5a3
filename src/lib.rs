//! # storecrate
//!
//! REST backend for a small storefront (users, categories, products, cart
//! items, order items) built on Axum and Sea-ORM.
//!
//! Every resource shares one query layer: `field__operator=value` filters
//! checked against a per-resource whitelist, `sort=-field` ordering, and
//! clamped pagination with page metadata. Responses use a single envelope:
//!
//! ```json
//! { "success": true, "message": "Successfully fetched all products", "statusCode": 200,
//!   "data": { "items": [], "page": 1, "pageSize": 10, "totalItems": 0,
//!             "totalPages": 0, "hasNext": false, "hasPrevious": false } }
//! ```
//!
//! ```rust,ignore
//! let db = sea_orm::Database::connect("sqlite::memory:").await?;
//! storecrate::migration::Migrator::up(&db, None).await?;
//! let app = storecrate::routes::app(db);
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod response;
pub mod routes;
pub mod server;

pub use crate::core::{CrudResource, MergeIntoActiveModel, Repository, paginate};
pub use errors::ApiError;
pub use response::ApiResponse;
