//! Tests against a real PostgreSQL server.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL`, so these
//! only run on request: `cargo test -- --ignored`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use crate::api;
use crate::models::Entity;

use super::AppState;

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    call(app, request).await
}

async fn get_data(app: &Router, table: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(format!("/getData/{table}"))
        .body(Body::empty())
        .unwrap();
    call(app, request).await
}

async fn row_count(pool: &PgPool, entity: Entity) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", entity.table()))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_category_round_trip(pool: PgPool) {
    let app = api::app(AppState::from_pool(pool).await.unwrap());

    let (status, created) = post(&app, "/addCategory", json!({ "name": "Beverages" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Beverages");
    assert!(created["id"].is_i64());

    let (status, rows) = get_data(&app, "categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([created]));
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_create_is_not_idempotent(pool: PgPool) {
    let app = api::app(AppState::from_pool(pool.clone()).await.unwrap());

    let body = json!({ "name": "Ada", "phone": "555-0100", "id": 1 });
    let (_, first) = post(&app, "/addCustomer", body.clone()).await;
    let (status, second) = post(&app, "/addCustomer", body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(first["id"], second["id"]);
    assert_eq!(row_count(&pool, Entity::Customer).await, 2);
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_validation_failure_inserts_nothing(pool: PgPool) {
    let app = api::app(AppState::from_pool(pool.clone()).await.unwrap());

    for entity in Entity::ALL {
        let (status, body) = post(&app, entity.spec().create_path, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": entity.spec().missing_message }));
        assert_eq!(row_count(&pool, entity).await, 0);
    }
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_every_entity(pool: PgPool) {
    let app = api::app(AppState::from_pool(pool.clone()).await.unwrap());

    let (_, category) = post(&app, "/addCategory", json!({ "name": "Coffee", "description": "Hot" })).await;
    let (_, customer) = post(&app, "/addCustomer", json!({ "name": "Ada", "phone": "1", "email": "ada@example.org" })).await;
    let (status, employee) = post(&app, "/addEmployee", json!({ "name": "Bob", "role": "barista", "salary": 2100.5 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee["role"], "barista");

    let (_, supplier) = post(&app, "/addSupplier", json!({ "name": "Beans Ltd", "contact_info": "beans@example.org" })).await;
    assert_eq!(supplier["contact"], "beans@example.org");

    let (status, inventory) = post(&app, "/addInventory", json!({ "item_name": "Arabica", "quantity": 0, "supplier_id": supplier["id"] })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(inventory["quantity"], 0);

    let (status, menu_item) = post(&app, "/addMenuItem", json!({ "name": "Espresso", "price": "2.50", "category_id": category["id"] })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(menu_item["price"], 2.5);

    let (_, table) = post(&app, "/addTable", json!({ "table_number": 7, "capacity": 4 })).await;
    let (status, order) = post(&app, "/addOrder", json!({ "customer_id": customer["id"], "table_id": table["id"] })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(order["created_at"].is_string());
    assert_eq!(order["total_amount"], Value::Null);

    let (status, order_item) = post(&app, "/addOrderItem", json!({ "order_id": order["id"], "menu_item_id": menu_item["id"], "quantity": 2 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order_item["price_at_purchase"], Value::Null);

    let (status, payment) = post(&app, "/addPayment", json!({ "order_id": order["id"], "amount": 5, "method": "card" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(payment["paid_at"].is_string());

    for entity in Entity::ALL {
        assert_eq!(row_count(&pool, entity).await, 1, "{}", entity.table());
        let (status, rows) = get_data(&app, entity.table()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().unwrap().len(), 1);
    }
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_empty_table(pool: PgPool) {
    let app = api::app(AppState::from_pool(pool).await.unwrap());

    let (status, rows) = get_data(&app, "order_items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([]));
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_payment_for_unknown_order(pool: PgPool) {
    let app = api::app(AppState::from_pool(pool.clone()).await.unwrap());

    let (status, body) = post(&app, "/addPayment", json!({ "order_id": 4711, "amount": 3, "method": "cash" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("foreign key constraint"));
    assert_eq!(row_count(&pool, Entity::Payment).await, 0);
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_connection_crud(pool: PgPool) {
    let app_state = AppState::from_pool(pool).await.unwrap();
    let mut db = app_state.connection().await.unwrap();

    let spec = Entity::Table.spec();
    let statement = spec
        .insert_statement(&object(json!({ "table_number": "12" })))
        .unwrap();
    let row = object(db.insert_row(spec, statement).await.unwrap());
    assert_eq!(row["table_number"], 12);
    assert_eq!(row["capacity"], Value::Null);

    let rows = db.get_all_rows(Entity::Table).await.unwrap();
    assert_eq!(rows, vec![Value::Object(row)]);

    // Applying the schema a second time is a no-op.
    AppState::from_pool(app_state.pool.clone()).await.unwrap();
}
