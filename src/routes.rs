use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, RawQuery, State, rejection::JsonRejection},
    http::request::Parts,
    routing::get,
};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::{CrudResource, Repository, paginate};
use crate::entities::{CartItems, Categories, OrderItems, Product, Products, Users, products};
use crate::errors::ApiError;
use crate::filtering::{ListQuery, PaginatedData, QueryParams};
use crate::response::ApiResponse;

/// Integer `{id}` path segment. Anything else is a 422.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i32);

impl<S: Send + Sync> FromRequestParts<S> for ResourceId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::validation_failed(vec![err.body_text()]))?;
        raw.parse::<i32>()
            .map(Self)
            .map_err(|_| ApiError::validation_failed(vec![format!("Invalid id: {raw}")]))
    }
}

/// `?fields=id,name` on single-row reads.
#[derive(Debug, Default, Deserialize)]
pub struct FieldSelection {
    pub fields: Option<String>,
}

impl FieldSelection {
    fn names(&self) -> Option<Vec<String>> {
        self.fields.as_deref().map(|fields| {
            fields
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

fn invalid_body(rejection: &JsonRejection) -> ApiError {
    ApiError::validation_failed(vec![rejection.body_text()])
}

fn read_list_query<R: CrudResource>(query: Option<&str>) -> Result<ListQuery, ApiError> {
    let params = QueryParams::from_query_string(query.unwrap_or_default());
    ListQuery::from_params(&params, &R::filterable_fields(), &R::sortable_fields())
}

/// `GET /`: filtered, sorted, paginated list.
pub async fn get_all<R: Repository>(
    State(db): State<DatabaseConnection>,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<PaginatedData<R::Model>>, ApiError> {
    let list = read_list_query::<R>(query.as_deref())?;
    let data = paginate::<R, _>(&db, list.pagination, &list.options).await?;
    Ok(ApiResponse::ok(
        format!("Successfully fetched all {}", R::RESOURCE_NAME_PLURAL),
        data,
    ))
}

/// `GET /{id}`: the full row, or only `?fields=` when given.
pub async fn get_one<R: Repository>(
    State(db): State<DatabaseConnection>,
    ResourceId(id): ResourceId,
    Query(selection): Query<FieldSelection>,
) -> Result<ApiResponse<JsonValue>, ApiError> {
    let message = format!("Successfully fetched {}", R::RESOURCE_NAME_SINGULAR);

    if let Some(fields) = selection.names() {
        let row = R::get_by_id_columns(&db, id, &fields).await?;
        return Ok(ApiResponse::ok(message, row));
    }

    let model = R::get_by_id(&db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::RESOURCE_NAME_SINGULAR, Some(id.to_string())))?;
    let data = serde_json::to_value(model)
        .map_err(|err| ApiError::internal("Internal server error", Some(err.to_string())))?;
    Ok(ApiResponse::ok(message, data))
}

/// `POST /`
pub async fn create_one<R: Repository>(
    State(db): State<DatabaseConnection>,
    payload: Result<Json<R::CreateModel>, JsonRejection>,
) -> Result<ApiResponse<R::Model>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| invalid_body(&rejection))?;
    let created = R::create(&db, payload).await?;
    Ok(ApiResponse::created(
        format!("Successfully created {}", R::RESOURCE_NAME_SINGULAR),
        created,
    ))
}

/// `PUT /{id}`
pub async fn update_one<R: Repository>(
    State(db): State<DatabaseConnection>,
    ResourceId(id): ResourceId,
    payload: Result<Json<R::UpdateModel>, JsonRejection>,
) -> Result<ApiResponse<R::Model>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| invalid_body(&rejection))?;
    let updated = R::update(&db, id, payload).await?;
    Ok(ApiResponse::ok(
        format!("Successfully updated {}", R::RESOURCE_NAME_SINGULAR),
        updated,
    ))
}

/// `DELETE /{id}`: answers with the deleted row.
pub async fn delete_one<R: Repository>(
    State(db): State<DatabaseConnection>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<R::Model>, ApiError> {
    let deleted = R::delete(&db, id).await?;
    Ok(ApiResponse::ok(
        format!("Successfully deleted {}", R::RESOURCE_NAME_SINGULAR),
        deleted,
    ))
}

/// `GET /categories/{id}/products`: the product list scoped to one category.
pub async fn get_category_products(
    State(db): State<DatabaseConnection>,
    ResourceId(category_id): ResourceId,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<PaginatedData<Product>>, ApiError> {
    if Categories::get_by_id(&db, category_id).await?.is_none() {
        return Err(ApiError::not_found(
            Categories::RESOURCE_NAME_SINGULAR,
            Some(category_id.to_string()),
        ));
    }

    let mut list = read_list_query::<Products>(query.as_deref())?;
    list.options = list
        .options
        .with_scope(Condition::all().add(products::Column::CategoryId.eq(category_id)));
    let data = paginate::<Products, _>(&db, list.pagination, &list.options).await?;
    Ok(ApiResponse::ok(
        format!("Successfully fetched all products of category {category_id}"),
        data,
    ))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub database_connected: bool,
}

async fn health(State(db): State<DatabaseConnection>) -> ApiResponse<Health> {
    let database_connected = db.ping().await.is_ok();
    ApiResponse::ok(
        "storecrate is running",
        Health { database_connected },
    )
}

async fn fallback() -> ApiError {
    ApiError::not_found("Route", None)
}

/// List, read, create, update and delete routes for one resource.
pub fn resource_router<R: Repository>() -> Router<DatabaseConnection> {
    Router::new()
        .route("/", get(get_all::<R>).post(create_one::<R>))
        .route(
            "/{id}",
            get(get_one::<R>).put(update_one::<R>).delete(delete_one::<R>),
        )
}

/// The full API, without transport middleware.
pub fn app(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/users", resource_router::<Users>())
        .nest(
            "/categories",
            resource_router::<Categories>().route("/{id}/products", get(get_category_products)),
        )
        .nest("/products", resource_router::<Products>())
        .nest("/cartItems", resource_router::<CartItems>())
        .nest("/orderItems", resource_router::<OrderItems>())
        .fallback(fallback)
        .with_state(db)
}
