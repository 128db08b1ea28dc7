//! Repository for the `orders` table.
//!
//! Orders are always created together with their items in a single
//! transaction; a failure anywhere leaves no rows behind.

use sqlx::types::Json;
use sqlx::PgPool;
use threadmark_core::types::DbId;

use crate::models::order::{NewOrder, Order, OrderItem, OrderWithItems};
use crate::repositories::order_item_repo::{OrderItemRepo, ITEM_COLUMNS};

/// Column list for `orders` queries.
const ORDER_COLUMNS: &str = "\
    id, order_number, customer_email, status_id, total_cents, \
    created_at, updated_at";

/// Provides order creation and lookup.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert an order and all of its items atomically.
    ///
    /// Items receive positions `0..n` in input order.
    pub async fn create(pool: &PgPool, input: &NewOrder) -> Result<OrderWithItems, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO orders (order_number, customer_email, status_id, total_cents) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&input.order_number)
            .bind(&input.customer_email)
            .bind(input.status.id())
            .bind(input.total_cents)
            .fetch_one(&mut *tx)
            .await?;

        let item_query = format!(
            "INSERT INTO order_items (\
                order_id, position, product_id, color, size, quantity, \
                unit_price_cents, line_key, customization\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ITEM_COLUMNS}"
        );

        let mut items = Vec::with_capacity(input.items.len());
        for (position, item) in input.items.iter().enumerate() {
            let row = sqlx::query_as::<_, OrderItem>(&item_query)
                .bind(order.id)
                .bind(position as i32)
                .bind(item.product_id)
                .bind(&item.color)
                .bind(&item.size)
                .bind(item.quantity)
                .bind(item.unit_price_cents)
                .bind(item.line_key)
                .bind(item.customization.as_ref().map(Json))
                .fetch_one(&mut *tx)
                .await?;
            items.push(row);
        }

        tx.commit().await?;

        tracing::debug!(
            order_id = order.id,
            order_number = %order.order_number,
            item_count = items.len(),
            "Order persisted",
        );

        Ok(OrderWithItems { order, items })
    }

    /// Find an order by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an order by its public order number.
    pub async fn find_by_number(
        pool: &PgPool,
        order_number: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(order_number)
            .fetch_optional(pool)
            .await
    }

    /// Find an order together with its items.
    pub async fn find_with_items(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrderWithItems>, sqlx::Error> {
        let Some(order) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let items = OrderItemRepo::list_by_order(pool, id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Total number of orders.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
