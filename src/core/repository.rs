use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IdenStatic,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde_json::{Map, Value as JsonValue};

use super::error::{QueryError, RepositoryError};
use super::traits::{CrudResource, MergeIntoActiveModel};
use super::transaction::in_transaction;
use crate::filtering::{PaginatedData, PaginationParams, QueryOptions};

/// Storage operations shared by every [`CrudResource`].
///
/// Reads accept any [`ConnectionTrait`] and writes any [`TransactionTrait`],
/// so callers can pass the pool or an already open transaction. Writes
/// always run in their own (possibly nested) transaction.
#[async_trait]
pub trait Repository: CrudResource {
    /// One page of rows matching `options`, ordered by its sorts (or
    /// `createdAt desc`), with the primary key as final tiebreaker.
    async fn get_all<C>(
        db: &C,
        limit: u64,
        offset: u64,
        options: &QueryOptions,
    ) -> Result<Vec<Self::Model>, RepositoryError>
    where
        C: ConnectionTrait + Sync;

    /// `None` when no row has this id.
    async fn get_by_id<C>(db: &C, id: i32) -> Result<Option<Self::Model>, RepositoryError>
    where
        C: ConnectionTrait + Sync;

    /// Only the requested fields of one row, keyed by API name. An empty
    /// `fields` selects every selectable field.
    ///
    /// Unlike [`Repository::get_by_id`], a missing row is an error here.
    async fn get_by_id_columns<C>(
        db: &C,
        id: i32,
        fields: &[String],
    ) -> Result<JsonValue, RepositoryError>
    where
        C: ConnectionTrait + Sync;

    async fn count<C>(db: &C, options: &QueryOptions) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait + Sync;

    async fn create<C>(db: &C, data: Self::CreateModel) -> Result<Self::Model, RepositoryError>
    where
        C: TransactionTrait + Sync;

    /// Apply a partial update. `NotFound` when no row has this id.
    async fn update<C>(
        db: &C,
        id: i32,
        data: Self::UpdateModel,
    ) -> Result<Self::Model, RepositoryError>
    where
        C: TransactionTrait + Sync;

    /// Delete and return the row. `NotFound` when no row has this id.
    async fn delete<C>(db: &C, id: i32) -> Result<Self::Model, RepositoryError>
    where
        C: TransactionTrait + Sync;
}

#[async_trait]
impl<R: CrudResource> Repository for R {
    async fn get_all<C>(
        db: &C,
        limit: u64,
        offset: u64,
        options: &QueryOptions,
    ) -> Result<Vec<Self::Model>, RepositoryError>
    where
        C: ConnectionTrait + Sync,
    {
        let condition = options.condition(&Self::filterable_fields())?;
        let orders = options.orders(&Self::sortable_fields(), Self::CREATED_AT_COLUMN)?;
        let sorts_by_id = orders
            .iter()
            .any(|(column, _)| column.as_str() == Self::ID_COLUMN.as_str());

        let mut query = Self::EntityType::find().filter(condition);
        for (column, order) in orders {
            query = query.order_by(column, order);
        }
        if !sorts_by_id {
            query = query.order_by(Self::ID_COLUMN, Order::Desc);
        }

        Ok(query.limit(limit).offset(offset).all(db).await?)
    }

    async fn get_by_id<C>(db: &C, id: i32) -> Result<Option<Self::Model>, RepositoryError>
    where
        C: ConnectionTrait + Sync,
    {
        Ok(Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?)
    }

    async fn get_by_id_columns<C>(
        db: &C,
        id: i32,
        fields: &[String],
    ) -> Result<JsonValue, RepositoryError>
    where
        C: ConnectionTrait + Sync,
    {
        let selectable = Self::selectable_fields();
        let mut selected = Vec::new();
        for name in fields {
            let field = selectable
                .iter()
                .find(|(api_name, _)| api_name == name)
                .copied()
                .ok_or_else(|| QueryError::InvalidSelectField(name.clone()))?;
            if !selected.iter().any(|(api_name, _)| *api_name == field.0) {
                selected.push(field);
            }
        }
        if selected.is_empty() {
            selected = selectable;
        }

        let row = Self::EntityType::find()
            .select_only()
            .columns(selected.iter().map(|&(_, column)| column))
            .filter(Self::ID_COLUMN.eq(id))
            .into_json()
            .one(db)
            .await?
            .ok_or_else(|| RepositoryError::not_found(Self::RESOURCE_NAME_SINGULAR, id))?;

        Ok(rename_to_api_fields(row, &selected))
    }

    async fn count<C>(db: &C, options: &QueryOptions) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait + Sync,
    {
        let condition = options.condition(&Self::filterable_fields())?;
        Self::EntityType::find()
            .filter(condition)
            .count(db)
            .await
            .map_err(|err| match err {
                DbErr::Type(details) => RepositoryError::internal(format!(
                    "Unparsable count for {}: {details}",
                    Self::RESOURCE_NAME_PLURAL
                )),
                other => other.into(),
            })
    }

    async fn create<C>(db: &C, data: Self::CreateModel) -> Result<Self::Model, RepositoryError>
    where
        C: TransactionTrait + Sync,
    {
        in_transaction(db, move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let mut active: Self::ActiveModelType = data.into();
                active.set(Self::CREATED_AT_COLUMN, now.into());
                active.set(Self::UPDATED_AT_COLUMN, now.into());
                active.insert(txn).await.map_err(|err| match err {
                    DbErr::RecordNotInserted | DbErr::RecordNotFound(_) => {
                        RepositoryError::internal(format!(
                            "Failed to create {}",
                            Self::RESOURCE_NAME_SINGULAR
                        ))
                    }
                    other => other.into(),
                })
            })
        })
        .await
    }

    async fn update<C>(
        db: &C,
        id: i32,
        data: Self::UpdateModel,
    ) -> Result<Self::Model, RepositoryError>
    where
        C: TransactionTrait + Sync,
    {
        in_transaction(db, move |txn| {
            Box::pin(async move {
                let existing = Self::EntityType::find()
                    .filter(Self::ID_COLUMN.eq(id))
                    .one(txn)
                    .await?
                    .ok_or_else(|| RepositoryError::not_found(Self::RESOURCE_NAME_SINGULAR, id))?;

                let mut active = data.merge_into_activemodel(existing.into_active_model())?;
                active.set(Self::UPDATED_AT_COLUMN, Utc::now().into());
                active.update(txn).await.map_err(|err| match err {
                    DbErr::RecordNotUpdated => {
                        RepositoryError::not_found(Self::RESOURCE_NAME_SINGULAR, id)
                    }
                    other => other.into(),
                })
            })
        })
        .await
    }

    async fn delete<C>(db: &C, id: i32) -> Result<Self::Model, RepositoryError>
    where
        C: TransactionTrait + Sync,
    {
        in_transaction(db, move |txn| {
            Box::pin(async move {
                let existing = Self::EntityType::find()
                    .filter(Self::ID_COLUMN.eq(id))
                    .one(txn)
                    .await?
                    .ok_or_else(|| RepositoryError::not_found(Self::RESOURCE_NAME_SINGULAR, id))?;

                let result = Self::EntityType::delete_many()
                    .filter(Self::ID_COLUMN.eq(id))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(RepositoryError::not_found(Self::RESOURCE_NAME_SINGULAR, id));
                }
                Ok(existing)
            })
        })
        .await
    }
}

/// Count and fetch one page concurrently.
///
/// Both queries see the same `options`; if either fails the whole call
/// fails.
///
/// # Errors
///
/// The first error of [`Repository::count`] or [`Repository::get_all`].
pub async fn paginate<R, C>(
    db: &C,
    params: PaginationParams,
    options: &QueryOptions,
) -> Result<PaginatedData<R::Model>, RepositoryError>
where
    R: Repository,
    C: ConnectionTrait + Sync,
{
    let page = params.normalize();
    let (total_items, items) = tokio::try_join!(
        R::count(db, options),
        R::get_all(db, page.page_size, page.offset, options),
    )?;

    tracing::debug!(
        resource = R::RESOURCE_NAME_PLURAL,
        page = page.page,
        page_size = page.page_size,
        total_items,
        filters = options.filters.len(),
        "paginated query"
    );

    Ok(PaginatedData::new(items, page.meta(total_items)))
}

/// Replace storage column names by API field names, in selection order.
fn rename_to_api_fields<C: IdenStatic>(row: JsonValue, selected: &[(&'static str, C)]) -> JsonValue {
    let JsonValue::Object(mut columns) = row else {
        return row;
    };
    let renamed: Map<String, JsonValue> = selected
        .iter()
        .map(|(api_name, column)| {
            let value = columns.remove(column.as_str()).unwrap_or(JsonValue::Null);
            ((*api_name).to_string(), value)
        })
        .collect();
    JsonValue::Object(renamed)
}
