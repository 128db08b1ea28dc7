//! Repository for the `products` lookup table.

use sqlx::PgPool;
use threadmark_core::orders::ProductRef;
use threadmark_core::types::DbId;

use crate::models::product::{CreateProduct, Product};

/// Column list for `products` queries.
const COLUMNS: &str = "id, slug, name, base_price_cents, is_active, created_at, updated_at";

/// Provides lookups for products referenced by orders.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product. Product management is external; this exists for
    /// seeding and tests.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (slug, name, base_price_cents) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(input.base_price_cents)
            .fetch_one(pool)
            .await
    }

    /// Find an active product by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active product by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE slug = $1 AND is_active");
        sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Resolve an id-or-slug reference.
    pub async fn find_by_ref(
        pool: &PgPool,
        product: &ProductRef,
    ) -> Result<Option<Product>, sqlx::Error> {
        match product {
            ProductRef::Id(id) => Self::find_by_id(pool, *id).await,
            ProductRef::Slug(slug) => Self::find_by_slug(pool, slug).await,
        }
    }
}
