use sea_orm_migration::prelude::*;

use crate::entities::{cart_items, carts, categories, order_items, orders, products, users};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateStoreTables)]
    }
}

pub struct CreateStoreTables;

impl MigrationName for CreateStoreTables {
    fn name(&self) -> &'static str {
        "m20250101_000001_create_store_tables"
    }
}

fn id<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn reference<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column).integer().not_null().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for CreateStoreTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(users::Entity)
                    .if_not_exists()
                    .col(&mut id(users::Column::Id))
                    .col(ColumnDef::new(users::Column::Name).string_len(100).not_null())
                    .col(ColumnDef::new(users::Column::Email).string_len(100).not_null())
                    .col(&mut timestamp(users::Column::CreatedAt))
                    .col(&mut timestamp(users::Column::UpdatedAt))
                    .index(
                        Index::create()
                            .name("uq_users_email")
                            .col(users::Column::Email)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(categories::Entity)
                    .if_not_exists()
                    .col(&mut id(categories::Column::Id))
                    .col(ColumnDef::new(categories::Column::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(categories::Column::Description)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(&mut timestamp(categories::Column::CreatedAt))
                    .col(&mut timestamp(categories::Column::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(products::Entity)
                    .if_not_exists()
                    .col(&mut id(products::Column::Id))
                    .col(ColumnDef::new(products::Column::Name).string_len(100).not_null())
                    .col(ColumnDef::new(products::Column::Price).integer().not_null())
                    .col(ColumnDef::new(products::Column::Description).text().null())
                    .col(&mut reference(products::Column::CategoryId))
                    .col(&mut timestamp(products::Column::CreatedAt))
                    .col(&mut timestamp(products::Column::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category")
                            .from(products::Entity, products::Column::CategoryId)
                            .to(categories::Entity, categories::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(carts::Entity)
                    .if_not_exists()
                    .col(&mut id(carts::Column::Id))
                    .col(
                        ColumnDef::new(carts::Column::CodAvailable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(reference(carts::Column::UserId).unique_key())
                    .col(&mut timestamp(carts::Column::CreatedAt))
                    .col(&mut timestamp(carts::Column::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carts_user")
                            .from(carts::Entity, carts::Column::UserId)
                            .to(users::Entity, users::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(orders::Entity)
                    .if_not_exists()
                    .col(&mut id(orders::Column::Id))
                    .col(&mut reference(orders::Column::UserId))
                    .col(
                        ColumnDef::new(orders::Column::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(&mut timestamp(orders::Column::CreatedAt))
                    .col(&mut timestamp(orders::Column::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(orders::Entity, orders::Column::UserId)
                            .to(users::Entity, users::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(cart_items::Entity)
                    .if_not_exists()
                    .col(&mut id(cart_items::Column::Id))
                    .col(&mut reference(cart_items::Column::CartId))
                    .col(reference(cart_items::Column::ProductId).unique_key())
                    .col(
                        ColumnDef::new(cart_items::Column::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(&mut timestamp(cart_items::Column::CreatedAt))
                    .col(&mut timestamp(cart_items::Column::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_cart")
                            .from(cart_items::Entity, cart_items::Column::CartId)
                            .to(carts::Entity, carts::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_items_product")
                            .from(cart_items::Entity, cart_items::Column::ProductId)
                            .to(products::Entity, products::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(order_items::Entity)
                    .if_not_exists()
                    .col(&mut id(order_items::Column::Id))
                    .col(&mut reference(order_items::Column::OrderId))
                    .col(&mut reference(order_items::Column::ProductId))
                    .col(
                        ColumnDef::new(order_items::Column::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(&mut timestamp(order_items::Column::CreatedAt))
                    .col(&mut timestamp(order_items::Column::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(order_items::Entity, order_items::Column::OrderId)
                            .to(orders::Entity, orders::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_product")
                            .from(order_items::Entity, order_items::Column::ProductId)
                            .to(products::Entity, products::Column::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(order_items::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(cart_items::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(orders::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(carts::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(products::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(categories::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).to_owned())
            .await?;
        Ok(())
    }
}
