#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

use storecrate::Repository;
use storecrate::entities::{
    Categories, Category, Product, Products, User, Users, carts,
    categories::CategoryCreate, orders, products::ProductCreate, users::UserCreate,
};
use storecrate::migration::Migrator;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    storecrate::routes::app(db)
}

/// Send one request and decode the JSON envelope.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// `data.items` of a list response.
pub fn items(body: &Value) -> &Vec<Value> {
    body["data"]["items"].as_array().expect("list response has items")
}

pub fn ids(body: &Value) -> Vec<i64> {
    items(body)
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

pub async fn seed_category(db: &DatabaseConnection, name: &str) -> Category {
    Categories::create(
        db,
        CategoryCreate {
            name: Some(name.to_string()),
            description: Some(format!("All about {name}")),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_product(db: &DatabaseConnection, name: &str, price: i32, category_id: i32) -> Product {
    Products::create(
        db,
        ProductCreate {
            name: Some(name.to_string()),
            price: Some(price),
            description: None,
            category_id: Some(category_id),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_user(db: &DatabaseConnection, name: &str, email: &str) -> User {
    Users::create(
        db,
        UserCreate {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        },
    )
    .await
    .unwrap()
}

/// Carts and orders have no REST surface, so they are inserted directly.
pub async fn seed_cart(db: &DatabaseConnection, user_id: i32) -> carts::Model {
    let now = Utc::now();
    carts::ActiveModel {
        user_id: Set(user_id),
        cod_available: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_order(db: &DatabaseConnection, user_id: i32) -> orders::Model {
    let now = Utc::now();
    orders::ActiveModel {
        user_id: Set(user_id),
        status: Set("pending".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
