//! Typed HTTP access to the order and screenshot endpoints.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use threadmark_core::customization::CustomizationRecord;
use threadmark_core::orders::ProductRef;
use threadmark_core::screenshots::{ScreenshotSet, ViewMap};
use threadmark_core::types::DbId;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One order line as submitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product: ProductRef,
    pub color: String,
    pub size: String,
    pub quantity: i32,
    pub line_key: Option<Uuid>,
    pub customization: Option<CustomizationRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_email: String,
    pub items: Vec<OrderLineRequest>,
}

/// The parts of a created order item the client needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedItem {
    pub id: DbId,
    pub position: i32,
    pub product_id: DbId,
    pub color: String,
    pub size: String,
    pub line_key: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub id: DbId,
    pub order_number: String,
    pub items: Vec<CreatedItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemRequest {
    pub item_id: DbId,
    pub screenshots: ViewMap<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// Server operations used by checkout.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, ClientError>;

    /// Upload PNG data URLs for one item; returns the persisted URLs.
    async fn upload_item_screenshots(
        &self,
        order_id: DbId,
        item_id: DbId,
        screenshots: &ViewMap<String>,
    ) -> Result<ScreenshotSet, ClientError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// reqwest-backed API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    pub async fn get_order(&self, order_id: DbId) -> Result<serde_json::Value, ClientError> {
        let response = self.http.get(self.url(&format!("/orders/{order_id}"))).send().await?;
        read_data(response).await
    }

    /// Upload several items in one request; items are processed in order.
    pub async fn upload_batch_screenshots(
        &self,
        order_id: DbId,
        items: Vec<BatchItemRequest>,
    ) -> Result<BTreeMap<DbId, ScreenshotSet>, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/orders/{order_id}/screenshots")))
            .json(&serde_json::json!({ "items": items }))
            .send()
            .await?;
        read_data(response).await
    }
}

#[async_trait]
impl OrderApi for ApiClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, ClientError> {
        let response = self.http.post(self.url("/orders")).json(request).send().await?;
        read_data(response).await
    }

    async fn upload_item_screenshots(
        &self,
        order_id: DbId,
        item_id: DbId,
        screenshots: &ViewMap<String>,
    ) -> Result<ScreenshotSet, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/orders/{order_id}/items/{item_id}/screenshots")))
            .json(screenshots)
            .send()
            .await?;
        read_data(response).await
    }
}

/// Unwrap the `{ data }` envelope, or turn an error body into [`ClientError::Api`].
async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        let envelope: Envelope<T> = response.json().await?;
        return Ok(envelope.data);
    }

    let text = response.text().await?;
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => ("UNKNOWN".to_string(), text),
    };
    Err(ClientError::Api {
        status,
        code,
        message,
    })
}
