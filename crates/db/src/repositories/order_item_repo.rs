//! Repository for the `order_items` table.

use sqlx::types::Json;
use sqlx::PgPool;
use threadmark_core::screenshots::ScreenshotSet;
use threadmark_core::types::DbId;

use crate::models::order::OrderItem;

/// Column list for `order_items` queries.
pub(crate) const ITEM_COLUMNS: &str = "\
    id, order_id, position, product_id, color, size, quantity, \
    unit_price_cents, line_key, customization, screenshots, \
    screenshots_attached_at, created_at, updated_at";

/// Provides lookups and the one post-creation mutation of order items.
pub struct OrderItemRepo;

impl OrderItemRepo {
    /// List all items of an order by position.
    pub async fn list_by_order(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position"
        );
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// Find an item that belongs to the given order.
    pub async fn find(
        pool: &PgPool,
        order_id: DbId,
        item_id: DbId,
    ) -> Result<Option<OrderItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE id = $1 AND order_id = $2"
        );
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(item_id)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    /// Attach a screenshot set to an item.
    ///
    /// Succeeds at most once per item. Returns `None` if the item does not
    /// exist in the order or already has screenshots attached.
    pub async fn attach_screenshots(
        pool: &PgPool,
        order_id: DbId,
        item_id: DbId,
        screenshots: &ScreenshotSet,
    ) -> Result<Option<OrderItem>, sqlx::Error> {
        let query = format!(
            "UPDATE order_items SET \
                screenshots = $3, \
                screenshots_attached_at = NOW(), \
                updated_at = NOW() \
             WHERE id = $1 AND order_id = $2 AND screenshots_attached_at IS NULL \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(item_id)
            .bind(order_id)
            .bind(Json(screenshots))
            .fetch_optional(pool)
            .await
    }
}
