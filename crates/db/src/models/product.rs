//! Product lookup model.

use serde::Serialize;
use sqlx::FromRow;
use threadmark_core::types::{DbId, Timestamp};

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub base_price_cents: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO, used by seeding and tests.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub slug: String,
    pub name: String,
    pub base_price_cents: i64,
}
