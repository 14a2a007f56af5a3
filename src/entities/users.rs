use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::{CrudResource, MergeIntoActiveModel, provided};
use crate::filtering::whitelist::{
    FieldKind, FilterField, ID_OPERATORS, RANGE_OPERATORS, TEXT_OPERATORS,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<UserCreate> for ActiveModel {
    fn from(create: UserCreate) -> Self {
        Self {
            name: provided(create.name),
            email: provided(create.email),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl MergeIntoActiveModel<ActiveModel> for UserUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = ActiveValue::Set(name);
        }
        if let Some(email) = self.email {
            existing.email = ActiveValue::Set(email);
        }
        Ok(existing)
    }
}

/// `/users`
pub struct Users;

impl CrudResource for Users {
    type EntityType = Entity;
    type Model = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = UserCreate;
    type UpdateModel = UserUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const UPDATED_AT_COLUMN: Column = Column::UpdatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "user";
    const RESOURCE_NAME_PLURAL: &'static str = "users";

    fn filterable_fields() -> Vec<FilterField<Column>> {
        vec![
            FilterField::new("id", Column::Id, FieldKind::Integer, ID_OPERATORS),
            FilterField::new("name", Column::Name, FieldKind::Text, TEXT_OPERATORS),
            FilterField::new("email", Column::Email, FieldKind::Text, TEXT_OPERATORS),
            FilterField::new("createdAt", Column::CreatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
            FilterField::new("updatedAt", Column::UpdatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
        ]
    }

    fn sortable_fields() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("email", Column::Email),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    fn selectable_fields() -> Vec<(&'static str, Column)> {
        Self::sortable_fields()
    }
}
