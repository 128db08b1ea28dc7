use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{guide, orders, screenshots};
use crate::state::AppState;

/// Order routes mounted at `/orders`.
///
/// ```text
/// POST   /                                  -> create_order
/// GET    /{id}                              -> get_order
/// GET    /by-number/{order_number}          -> get_order_by_number
/// POST   /{id}/items/{item_id}/screenshots  -> upload_item_screenshots
/// POST   /{id}/screenshots                  -> upload_batch_screenshots
/// GET    /{id}/items/{item_id}/guide/{zone} -> get_item_guide
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create_order))
        .route("/{id}", get(orders::get_order))
        .route("/by-number/{order_number}", get(orders::get_order_by_number))
        .route(
            "/{id}/items/{item_id}/screenshots",
            post(screenshots::upload_item_screenshots),
        )
        .route("/{id}/screenshots", post(screenshots::upload_batch_screenshots))
        .route("/{id}/items/{item_id}/guide/{zone}", get(guide::get_item_guide))
}
