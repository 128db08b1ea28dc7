//! Order-level helpers: product references, order numbers, totals.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum quantity accepted on a single order line.
pub const MAX_LINE_QUANTITY: i32 = 500;

/// How an order line refers to its product: numeric id or slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(DbId),
    Slug(String),
}

impl ProductRef {
    /// Parse a path/query value: all-digit strings are ids, anything else a slug.
    pub fn parse(value: &str) -> Self {
        match value.parse::<DbId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Slug(value.to_string()),
        }
    }

    /// The entity-not-found error for this reference.
    pub fn not_found(&self) -> CoreError {
        match self {
            Self::Id(id) => CoreError::NotFound {
                entity: "Product",
                id: *id,
            },
            Self::Slug(slug) => CoreError::NotFoundByKey {
                entity: "Product",
                key: slug.clone(),
            },
        }
    }
}

/// `ORD-{YYYYMMDD}-{8 upper-case hex}`.
pub fn generate_order_number(now: Timestamp) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d"))
}

/// Validate a line quantity.
pub fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if (1..=MAX_LINE_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Quantity {quantity} out of range [1, {MAX_LINE_QUANTITY}]"
        )))
    }
}

/// Sum of `unit_price_cents * quantity` over all lines.
pub fn order_total_cents<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines
        .into_iter()
        .map(|(unit, qty)| unit * i64::from(qty))
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
