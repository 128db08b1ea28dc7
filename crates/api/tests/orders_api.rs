//! HTTP-level integration tests for order creation and screenshot attach.
//!
//! Each test gets a fresh database from `#[sqlx::test]` (needs `DATABASE_URL`).

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use common::{
    body_bytes, body_json, build_test_app, build_test_app_with_store, get, png_data_url, post_json,
};
use serde_json::json;
use sqlx::PgPool;
use threadmark_db::models::product::CreateProduct;
use threadmark_db::repositories::{OrderRepo, ProductRepo};
use threadmark_storage::{MemoryStore, ObjectStore, StorageError, StoredObject};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Store that rejects every key containing `fail_marker`.
struct FlakyStore {
    inner: MemoryStore,
    fail_marker: &'static str,
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        if key.contains(self.fail_marker) {
            return Err(StorageError::Backend("connection reset".into()));
        }
        self.inner.put(key, bytes, content_type).await
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }

    fn backend(&self) -> &'static str {
        "flaky"
    }
}

async fn seed_product(pool: &PgPool) -> i64 {
    ProductRepo::create(
        pool,
        &CreateProduct {
            slug: "classic-tee".into(),
            name: "Classic Tee".into(),
            base_price_cents: 2500,
        },
    )
    .await
    .unwrap()
    .id
}

fn order_body(product: serde_json::Value) -> serde_json::Value {
    json!({
        "customerEmail": "buyer@example.com",
        "items": [
            {
                "product": product,
                "color": "black",
                "size": "M",
                "quantity": 2,
                "lineKey": "6f1f7a58-5a3e-4f55-9a55-3c3b2b7c8f10",
                "customization": {
                    "front": {
                        "image": { "url": "https://cdn.example.com/logo.png" },
                        "position": { "x": 0.0, "y": 0.0 },
                        "scale": 0.6,
                        "rotation": 0
                    }
                }
            },
            { "product": product, "color": "white", "size": "L", "quantity": 1 }
        ]
    })
}

/// Create the two-line order from [`order_body`] and return the response body.
async fn create_order(app: &Router, product_id: i64) -> serde_json::Value {
    let response = post_json(app.clone(), "/api/v1/orders", order_body(json!(product_id))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn four_views() -> serde_json::Value {
    json!({
        "front": png_data_url(),
        "back": png_data_url(),
        "left": png_data_url(),
        "right": png_data_url(),
    })
}

// ---------------------------------------------------------------------------
// Order creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_order_by_slug_returns_items_with_print_spec(pool: PgPool) {
    seed_product(&pool).await;
    let app = build_test_app(pool.clone());

    let response = post_json(app.clone(), "/api/v1/orders", order_body(json!("classic-tee"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let order = &json["data"];
    assert!(order["orderNumber"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["totalCents"], 7500);

    let items = order["items"].as_array().unwrap();
    assert_eq!(items[0]["position"], 0);
    assert_eq!(items[0]["assetStatus"]["state"], "no-screenshots");
    assert_eq!(items[0]["printSpec"]["zones"][0]["measurements"]["designSizeCm"], 12.0);
    assert!(items[1]["printSpec"].is_null());

    let id = order["id"].as_i64().unwrap();
    let fetched = body_json(get(app, &format!("/api/v1/orders/{id}")).await).await;
    assert_eq!(fetched["data"]["items"][0]["customization"]["front"]["scale"], 0.6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_product_persists_nothing(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = post_json(app, "/api/v1/orders", order_body(json!("no-such-tee"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Product 'no-such-tee' not found");
    assert_eq!(OrderRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_customization_is_rejected_before_persisting(pool: PgPool) {
    let product_id = seed_product(&pool).await;
    let app = build_test_app(pool.clone());

    let mut body = order_body(json!(product_id));
    body["items"][0]["customization"]["front"]["rotation"] = json!(270);

    let response = post_json(app, "/api/v1/orders", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(OrderRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Screenshot attach
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_failed_view_still_attaches_the_other_three(pool: PgPool) {
    let product_id = seed_product(&pool).await;
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        fail_marker: "/left-",
    });
    let app = build_test_app_with_store(pool.clone(), store);

    let created = create_order(&app, product_id).await;
    let order_id = created["data"]["id"].as_i64().unwrap();
    let item_id = created["data"]["items"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/orders/{order_id}/items/{item_id}/screenshots");

    let response = post_json(app.clone(), &uri, four_views()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["front"].as_str().unwrap().starts_with("/upload/spaces/test/orders/"));
    assert!(json["data"]["front"].as_str().unwrap().contains("/item-0/front-"));
    assert!(json["data"]["left"].is_null());
    assert!(json["data"]["right"].is_string());

    let order = body_json(get(app.clone(), &format!("/api/v1/orders/{order_id}")).await).await;
    assert_eq!(order["data"]["items"][0]["assetStatus"]["state"], "persisted");
    assert_eq!(order["data"]["items"][0]["assetStatus"]["count"], 3);

    // Attach is one-shot.
    let again = post_json(app, &uri, four_views()).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_upload_skips_unknown_items(pool: PgPool) {
    let product_id = seed_product(&pool).await;
    let app = build_test_app(pool.clone());

    let created = create_order(&app, product_id).await;
    let order_id = created["data"]["id"].as_i64().unwrap();
    let first = created["data"]["items"][0]["id"].as_i64().unwrap();
    let second = created["data"]["items"][1]["id"].as_i64().unwrap();

    let body = json!({
        "items": [
            { "itemId": first, "screenshots": four_views() },
            { "itemId": 999999, "screenshots": four_views() },
            { "itemId": second, "screenshots": { "front": png_data_url() } }
        ]
    });
    let response = post_json(app, &format!("/api/v1/orders/{order_id}/screenshots"), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_object().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[&first.to_string()].as_object().unwrap().len(), 4);
    assert!(data[&second.to_string()]["front"].as_str().unwrap().contains("/item-1/"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_with_failing_view_and_repeated_item(pool: PgPool) {
    let product_id = seed_product(&pool).await;
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        fail_marker: "/left-",
    });
    let app = build_test_app_with_store(pool.clone(), store.clone());

    let created = create_order(&app, product_id).await;
    let order_id = created["data"]["id"].as_i64().unwrap();
    let first = created["data"]["items"][0]["id"].as_i64().unwrap();

    let body = json!({
        "items": [
            { "itemId": first, "screenshots": four_views() },
            { "itemId": first, "screenshots": four_views() }
        ]
    });
    let uri = format!("/api/v1/orders/{order_id}/screenshots");
    let response = post_json(app.clone(), &uri, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let set = json["data"][&first.to_string()].as_object().unwrap();
    assert_eq!(set.len(), 3);
    assert!(!set.contains_key("left"));

    // The repeated entry is refused before anything is written.
    assert_eq!(store.inner.len().await, 3);

    let order = body_json(get(app, &format!("/api/v1/orders/{order_id}")).await).await;
    assert_eq!(order["data"]["items"][0]["assetStatus"]["count"], 3);
}

// ---------------------------------------------------------------------------
// Placement guide
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn guide_is_rebuilt_from_stored_record(pool: PgPool) {
    let product_id = seed_product(&pool).await;
    let app = build_test_app(pool.clone());

    let created = create_order(&app, product_id).await;
    let order_id = created["data"]["id"].as_i64().unwrap();
    let customized = created["data"]["items"][0]["id"].as_i64().unwrap();
    let plain = created["data"]["items"][1]["id"].as_i64().unwrap();

    let response = get(
        app.clone(),
        &format!("/api/v1/orders/{order_id}/items/{customized}/guide/front"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");
    let svg = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(svg.contains("Front | 12.0 cm (4.7 in) | Center | No rotation"));

    let missing = get(app, &format!("/api/v1/orders/{order_id}/items/{plain}/guide/front")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
