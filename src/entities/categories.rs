use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::{CrudResource, MergeIntoActiveModel, provided};
use crate::filtering::FilterOperator;
use crate::filtering::whitelist::{
    FieldKind, FilterField, ID_OPERATORS, RANGE_OPERATORS, TEXT_OPERATORS,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(512))")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<CategoryCreate> for ActiveModel {
    fn from(create: CategoryCreate) -> Self {
        Self {
            name: provided(create.name),
            description: provided(create.description),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MergeIntoActiveModel<ActiveModel> for CategoryUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = ActiveValue::Set(name);
        }
        if let Some(description) = self.description {
            existing.description = ActiveValue::Set(description);
        }
        Ok(existing)
    }
}

const DESCRIPTION_OPERATORS: &[FilterOperator] =
    &[FilterOperator::Eq, FilterOperator::Ne, FilterOperator::Like];

/// `/categories`
pub struct Categories;

impl CrudResource for Categories {
    type EntityType = Entity;
    type Model = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = CategoryCreate;
    type UpdateModel = CategoryUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const UPDATED_AT_COLUMN: Column = Column::UpdatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "category";
    const RESOURCE_NAME_PLURAL: &'static str = "categories";

    fn filterable_fields() -> Vec<FilterField<Column>> {
        vec![
            FilterField::new("id", Column::Id, FieldKind::Integer, ID_OPERATORS),
            FilterField::new("name", Column::Name, FieldKind::Text, TEXT_OPERATORS),
            FilterField::new("description", Column::Description, FieldKind::Text, DESCRIPTION_OPERATORS),
            FilterField::new("createdAt", Column::CreatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
            FilterField::new("updatedAt", Column::UpdatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
        ]
    }

    fn sortable_fields() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("description", Column::Description),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    fn selectable_fields() -> Vec<(&'static str, Column)> {
        Self::sortable_fields()
    }
}
