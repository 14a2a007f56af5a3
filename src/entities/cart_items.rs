use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::{CrudResource, MergeIntoActiveModel, provided};
use crate::filtering::whitelist::{
    FieldKind, FilterField, ID_OPERATORS, QUANTITY_OPERATORS, RANGE_OPERATORS,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cart_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id",
        on_delete = "Cascade"
    )]
    Cart,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A missing `quantity` falls back to the column default of 1.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemCreate {
    pub cart_id: Option<i32>,
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

impl From<CartItemCreate> for ActiveModel {
    fn from(create: CartItemCreate) -> Self {
        Self {
            cart_id: provided(create.cart_id),
            product_id: provided(create.product_id),
            quantity: provided(create.quantity),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemUpdate {
    pub cart_id: Option<i32>,
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

impl MergeIntoActiveModel<ActiveModel> for CartItemUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(cart_id) = self.cart_id {
            existing.cart_id = ActiveValue::Set(cart_id);
        }
        if let Some(product_id) = self.product_id {
            existing.product_id = ActiveValue::Set(product_id);
        }
        if let Some(quantity) = self.quantity {
            existing.quantity = ActiveValue::Set(quantity);
        }
        Ok(existing)
    }
}

/// `/cartItems`
pub struct CartItems;

impl CrudResource for CartItems {
    type EntityType = Entity;
    type Model = Model;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = CartItemCreate;
    type UpdateModel = CartItemUpdate;

    const ID_COLUMN: Column = Column::Id;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const UPDATED_AT_COLUMN: Column = Column::UpdatedAt;
    const RESOURCE_NAME_SINGULAR: &'static str = "cart item";
    const RESOURCE_NAME_PLURAL: &'static str = "cart items";

    fn filterable_fields() -> Vec<FilterField<Column>> {
        vec![
            FilterField::new("id", Column::Id, FieldKind::Integer, ID_OPERATORS),
            FilterField::new("cartId", Column::CartId, FieldKind::Integer, ID_OPERATORS),
            FilterField::new("productId", Column::ProductId, FieldKind::Integer, ID_OPERATORS),
            FilterField::new("quantity", Column::Quantity, FieldKind::Integer, QUANTITY_OPERATORS),
            FilterField::new("createdAt", Column::CreatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
            FilterField::new("updatedAt", Column::UpdatedAt, FieldKind::Timestamp, RANGE_OPERATORS),
        ]
    }

    fn sortable_fields() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("cartId", Column::CartId),
            ("productId", Column::ProductId),
            ("quantity", Column::Quantity),
            ("createdAt", Column::CreatedAt),
            ("updatedAt", Column::UpdatedAt),
        ]
    }

    fn selectable_fields() -> Vec<(&'static str, Column)> {
        Self::sortable_fields()
    }
}
