//! Order and order item models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use threadmark_core::customization::CustomizationRecord;
use threadmark_core::orders::ProductRef;
use threadmark_core::screenshots::{AssetStatus, ScreenshotSet};
use threadmark_core::types::{DbId, Timestamp};

use crate::models::status::{OrderStatus, StatusId};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub customer_email: String,
    pub status_id: StatusId,
    pub total_cents: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    /// Zero-based index within the order; used in storage keys.
    pub position: i32,
    pub product_id: DbId,
    pub color: String,
    pub size: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_key: Option<Uuid>,
    pub customization: Option<Json<CustomizationRecord>>,
    pub screenshots: Option<Json<ScreenshotSet>>,
    pub screenshots_attached_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Lifecycle status, if the id is one this build knows.
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_id(self.status_id)
    }
}

impl OrderItem {
    pub fn customization(&self) -> Option<&CustomizationRecord> {
        self.customization.as_ref().map(|json| &json.0)
    }

    pub fn screenshot_set(&self) -> Option<&ScreenshotSet> {
        self.screenshots.as_ref().map(|json| &json.0)
    }

    /// Screenshot lifecycle state as seen from persistence.
    pub fn asset_status(&self) -> AssetStatus {
        AssetStatus::from_attached(self.screenshot_set())
    }

    /// True when the item carries a non-empty customization record.
    pub fn is_customized(&self) -> bool {
        self.customization().is_some_and(|record| !record.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Create DTOs (API input)
// ---------------------------------------------------------------------------

/// One line of an order creation request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    /// Product id or slug.
    pub product: ProductRef,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
    #[validate(length(min = 1, max = 20))]
    pub size: String,
    pub quantity: i32,
    /// Client-generated key used to attach screenshots unambiguously.
    #[serde(default)]
    pub line_key: Option<Uuid>,
    /// Raw customization record, parsed and validated by the handler so a
    /// malformed record gets the same error envelope as any other 400.
    #[serde(default)]
    pub customization: Option<serde_json::Value>,
}

/// Order creation request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 1, max = 100))]
    pub items: Vec<CreateOrderItem>,
}

// ---------------------------------------------------------------------------
// Insert DTOs (resolved, ready for persistence)
// ---------------------------------------------------------------------------

/// A fully resolved order line: product and price are known.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: DbId,
    pub color: String,
    pub size: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_key: Option<Uuid>,
    pub customization: Option<CustomizationRecord>,
}

/// A fully resolved order, inserted atomically with its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_email: String,
    pub total_cents: i64,
    pub items: Vec<NewOrderItem>,
}

/// An order together with its items, ordered by position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
