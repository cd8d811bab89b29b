use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use products_crud::app::product::{
    MemoryProductStore, Product, ProductInput, ProductStore, StoreError,
};
use products_crud::{create_routes, AppState, ProductService};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn server_with(store: Arc<dyn ProductStore>) -> TestServer {
    let state = AppState {
        product_service: ProductService::new(store),
    };
    TestServer::new(create_routes(state, Duration::from_secs(5))).unwrap()
}

fn server() -> TestServer {
    server_with(Arc::new(MemoryProductStore::new()))
}

fn timestamp(body: &Value, field: &str) -> DateTime<Utc> {
    body[field].as_str().unwrap().parse().unwrap()
}

/// 存储永远失败，用于验证 500 响应不泄露细节
struct BrokenStore;

#[async_trait]
impl ProductStore for BrokenStore {
    async fn insert(&self, _: &ProductInput) -> Result<Product, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
    async fn get(&self, _: i32) -> Result<Option<Product>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
    async fn update(&self, _: i32, _: &ProductInput) -> Result<Option<Product>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
    async fn delete(&self, _: i32) -> Result<Option<Product>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
}

#[tokio::test]
async fn root_returns_plaintext_greeting() {
    let server = server();

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().starts_with("Hello"));
}

#[tokio::test]
async fn health_reports_storage_status() {
    let response = server().get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");

    let response = server_with(Arc::new(BrokenStore)).get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["storage"], "unavailable");
}

/// 每个请求都比超时时间慢
struct SlowStore;

#[async_trait]
impl ProductStore for SlowStore {
    async fn insert(&self, _: &ProductInput) -> Result<Product, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(StoreError::Unavailable("slow".to_string()))
    }
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }
    async fn get(&self, _: i32) -> Result<Option<Product>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
    async fn update(&self, _: i32, _: &ProductInput) -> Result<Option<Product>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
    async fn delete(&self, _: i32) -> Result<Option<Product>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn assert_request_id(response: &axum_test::TestResponse) {
    let request_id = response
        .maybe_header("x-request-id")
        .expect("missing x-request-id");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let server = server();

    let response = server.get("/products").await;
    assert_request_id(&response);

    let response = server.get("/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_request_id(&response);

    let response = server
        .method(Method::OPTIONS, "/products")
        .add_header("origin", "http://localhost:5173")
        .add_header("access-control-request-method", "POST")
        .await;
    response.assert_status_ok();
    assert!(response
        .maybe_header("access-control-allow-origin")
        .is_some());
    assert_request_id(&response);
}

#[tokio::test]
async fn timed_out_requests_carry_request_id() {
    let state = AppState {
        product_service: ProductService::new(Arc::new(SlowStore)),
    };
    let server = TestServer::new(create_routes(state, Duration::from_millis(50))).unwrap();

    let response = server.get("/products").await;
    response.assert_status(StatusCode::REQUEST_TIMEOUT);
    assert_request_id(&response);
}

#[tokio::test]
async fn create_returns_new_row_with_parsed_price() {
    let server = server();

    let response = server
        .post("/products")
        .json(&json!({"name": "Widget", "price": 9.99}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Widget");
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["price"].as_f64(), Some(9.99));
    assert_eq!(timestamp(&body, "created_at"), timestamp(&body, "updated_at"));
}

#[tokio::test]
async fn create_accepts_price_given_as_string() {
    let server = server();

    let response = server
        .post("/products")
        .json(&json!({"name": "Gadget", "description": "shiny", "price": "12.50"}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["price"].as_f64(), Some(12.5));
    assert_eq!(body["description"], "shiny");
}

#[tokio::test]
async fn create_without_required_fields_persists_nothing() {
    let server = server();

    for body in [
        json!({"price": 9.99}),
        json!({"name": "Widget"}),
        json!({"name": "", "price": 1}),
        json!({"name": "Widget", "price": null}),
    ] {
        let response = server.post("/products").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["kind"], "BAD_REQUEST");
        assert_eq!(error["error"], "Name and price are required");
    }

    let listed: Value = server.get("/products").await.json();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn create_with_unreadable_body_is_a_client_error() {
    let server = server();

    let response = server.post("/products").text("name=Widget&price=1").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/products")
        .json(&json!({"name": "Widget", "price": "cheap"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "Price must be a number");
}

#[tokio::test]
async fn create_rounds_prices_below_decimal_precision() {
    let server = server();

    let response = server
        .post("/products")
        .json(&json!({"name": "Tiny", "price": 1e-30}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["price"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn create_with_price_beyond_range_is_rejected() {
    let server = server();

    let response = server
        .post("/products")
        .json(&json!({"name": "Huge", "price": 1e30}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "Price is out of range");

    let listed: Value = server.get("/products").await.json();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn unknown_ids_are_not_found_for_get_update_and_delete() {
    let server = server();
    let valid = json!({"name": "Widget", "price": 1});

    for id in ["999", "abc"] {
        let path = format!("/products/{id}");

        let response = server.get(&path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let error: Value = response.json();
        assert_eq!(error["error"], "Product not found");

        server
            .put(&path)
            .json(&valid)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn list_returns_rows_in_ascending_id_order() {
    let server = server();
    for (name, price) in [("first", 1), ("second", 2), ("third", 3)] {
        server
            .post("/products")
            .json(&json!({"name": name, "price": price}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server.get("/products").await;
    response.assert_status_ok();
    let rows: Vec<Value> = response.json();
    let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn update_replaces_fields_and_moves_timestamp_forward() {
    let server = server();
    let created: Value = server
        .post("/products")
        .json(&json!({"name": "Widget", "description": "old", "price": 9.99}))
        .await
        .json();

    let response = server
        .put("/products/1")
        .json(&json!({"name": "Widget Pro", "price": "19.99"}))
        .await;

    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Widget Pro");
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["price"].as_f64(), Some(19.99));
    assert_eq!(updated["created_at"], created["created_at"]);
    assert!(timestamp(&updated, "updated_at") > timestamp(&created, "updated_at"));

    let fetched: Value = server.get("/products/1").await.json();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_validates_before_lookup() {
    let server = server();
    server
        .post("/products")
        .json(&json!({"name": "Widget", "price": 1}))
        .await;

    let response = server
        .put("/products/1")
        .json(&json!({"name": "Widget"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "Name and price are required for update");

    server
        .put("/products/999")
        .json(&json!({"price": 1}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let unchanged: Value = server.get("/products/1").await.json();
    assert_eq!(unchanged["name"], "Widget");
}

#[tokio::test]
async fn widget_lifecycle() {
    let server = server();

    let response = server
        .post("/products")
        .json(&json!({"name": "Widget", "price": 9.99}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();

    let response = server.get("/products/1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), created);

    let response = server.delete("/products/1").await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());

    server
        .get("/products/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/products/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_failures_are_opaque_server_errors() {
    let server = server_with(Arc::new(BrokenStore));
    let valid = json!({"name": "Widget", "price": 1});

    let responses = [
        server.post("/products").json(&valid).await,
        server.get("/products").await,
        server.get("/products/1").await,
        server.put("/products/1").json(&valid).await,
        server.delete("/products/1").await,
    ];

    for response in responses {
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let text = response.text();
        assert!(!text.contains("disk on fire"));
        let error: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(error["error"], "Internal server error");
        assert_eq!(error["code"], 500);
    }
}
