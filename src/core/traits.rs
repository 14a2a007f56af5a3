use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ColumnTrait, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, ModelTrait, Value,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::filtering::FilterField;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Merge this update model into an existing active model
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if the merge operation fails due to data conversion issues.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// Describes one REST resource: its entity, payload types, names and the
/// fields clients may filter, sort and select on.
///
/// Implemented by a unit type per resource. All storage operations come
/// from the blanket [`Repository`](super::repository::Repository) impl.
pub trait CrudResource: Send + Sync + 'static {
    type EntityType: EntityTrait<Model = Self::Model, Column = Self::ColumnType> + Sync;
    type Model: ModelTrait<Entity = Self::EntityType>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModelType>
        + Serialize
        + Clone
        + Send
        + Sync;
    type ColumnType: ColumnTrait + Copy + Send + Sync + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + From<Self::CreateModel>
        + Send
        + Sync;
    type CreateModel: DeserializeOwned + Send + 'static;
    type UpdateModel: DeserializeOwned + MergeIntoActiveModel<Self::ActiveModelType> + Send + 'static;

    const ID_COLUMN: Self::ColumnType;
    const CREATED_AT_COLUMN: Self::ColumnType;
    const UPDATED_AT_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    fn filterable_fields() -> Vec<FilterField<Self::ColumnType>>;

    fn sortable_fields() -> Vec<(&'static str, Self::ColumnType)>;

    /// Fields that `?fields=` may project, by API name.
    fn selectable_fields() -> Vec<(&'static str, Self::ColumnType)>;
}

/// `Some` becomes `Set`, `None` leaves the column to storage.
pub fn provided<T>(value: Option<T>) -> ActiveValue<T>
where
    T: Into<Value>,
{
    value.map_or(ActiveValue::NotSet, ActiveValue::Set)
}
