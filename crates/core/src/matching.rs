//! Matching client cart lines to server-assigned order items.
//!
//! A cart line carries a client-generated `line_key` that the server stores
//! on the order item, so the match is exact. Lines without a key fall back
//! to `(product_id, color, size)`, and only a unique fallback match is
//! accepted: two identical product/color/size lines with different designs
//! cannot be told apart, and guessing would attach the wrong screenshots.

use uuid::Uuid;

use crate::types::DbId;

/// The attributes used to identify a line on either side of the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIdentity {
    pub line_key: Option<Uuid>,
    pub product_id: DbId,
    pub color: String,
    pub size: String,
}

impl LineIdentity {
    fn same_variant(&self, other: &LineIdentity) -> bool {
        self.product_id == other.product_id && self.color == other.color && self.size == other.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchFailure {
    #[error("no order item matches the cart line")]
    NoMatch,

    #[error("{candidates} order items match the cart line")]
    Ambiguous { candidates: usize },
}

/// Find the order item id for one cart line.
pub fn match_line(
    cart: &LineIdentity,
    items: &[(DbId, LineIdentity)],
) -> Result<DbId, MatchFailure> {
    if let Some(key) = cart.line_key {
        return items
            .iter()
            .find(|(_, item)| item.line_key == Some(key))
            .map(|(id, _)| *id)
            .ok_or(MatchFailure::NoMatch);
    }

    let candidates: Vec<DbId> = items
        .iter()
        .filter(|(_, item)| item.same_variant(cart))
        .map(|(id, _)| *id)
        .collect();

    match candidates.as_slice() {
        [] => Err(MatchFailure::NoMatch),
        [id] => Ok(*id),
        many => Err(MatchFailure::Ambiguous { candidates: many.len() }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
