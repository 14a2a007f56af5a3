use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::{CrudResource, MergeIntoActiveModel, provided};
use crate::filtering::FilterOperator;
use crate::filtering::whitelist::{FieldKind, FilterField, RANGE_OPERATORS};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    pub price: i32,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: Option<String>,
    pub price: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
}

impl From<ProductCreate> for ActiveModel {
    fn from(create: ProductCreate) -> Self {
        Self {
            name: provided(create.name),
            price: provided(create.price),
            description: ActiveValue::Set(create.description),
            category_id: provided(create.category_id),
            ..Default::default()
        }
    }
}

/// `description: null` clears the description; an absent key keeps it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<i32>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub category_id: Option<i32>,
}

impl MergeIntoActiveModel<ActiveModel> for ProductUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = ActiveValue::Set(name);
        }
        if let Some(price) = self.price {
            existing.price = ActiveValue::Set(price);
        }
        if let Some(description) = self.description {
            existing.description = ActiveValue::Set(description);
        }
        if let Some(category_id) = self.category_id {
            existing.category_id = ActiveValue::Set(category_id);
        }
        Ok(existing)
    }
}

const NAME_OPERATORS: &[FilterOperator] =
    &[FilterOperator::Eq, FilterOperator::Ne, FilterOperator::Like];
const CATEGORY_OPERATORS: &[FilterOperator] = &[FilterOperator::Eq, FilterOperator::Ne];

/// `/products`, and `/categories/{id}/products` through a scope.
pub struct Products;

impl CrudResource for Products {
    type EntityType = Entity;
    type Model = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = ProductCreate;
    type UpdateModel = ProductUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const UPDATED_AT_COLUMN: Column = Column::UpdatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "product";
    const RESOURCE_NAME_PLURAL: &'static str = "products";

    fn filterable_fields() -> Vec<FilterField<Column>> {
        vec![
            FilterField::new("id", Column::Id, FieldKind::Integer, &[FilterOperator::Eq]),
            FilterField::new("name", Column::Name, FieldKind::Text, NAME_OPERATORS),
            FilterField::new("price", Column::Price, FieldKind::Integer, RANGE_OPERATORS),
            FilterField::new("categoryId", Column::CategoryId, FieldKind::Integer, CATEGORY_OPERATORS),
            FilterField::new("createdAt", Column::CreatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
            FilterField::new("updatedAt", Column::UpdatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
        ]
    }

    fn sortable_fields() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("price", Column::Price),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    fn selectable_fields() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("price", Column::Price),
            ("description", Column::Description),
            ("categoryId", Column::CategoryId),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }
}
