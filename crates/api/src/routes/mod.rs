pub mod health;
pub mod orders;
pub mod print;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /orders                                          create (POST)
/// /orders/{id}                                     get with items (GET)
/// /orders/by-number/{order_number}                 get by order number (GET)
/// /orders/{id}/items/{item_id}/screenshots         attach one item (POST)
/// /orders/{id}/screenshots                         attach batch (POST)
/// /orders/{id}/items/{item_id}/guide/{zone}        stored placement guide (GET)
///
/// /print-spec                                      derive print spec (POST)
/// /placement-guide/{zone}                          placement guide SVG (POST)
/// /calibration                                     zone calibration table (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", orders::router())
        .merge(print::router())
}
