use axum::routing::get;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Stored object proxy, mounted at the root (not under `/api/v1`) so stored
/// URLs stay stable across API versions.
pub fn router() -> Router<AppState> {
    Router::new().route("/upload/spaces/{*key}", get(uploads::get_object))
}
