use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{calibration, guide, print_spec};
use crate::state::AppState;

/// Stateless print-space routes.
///
/// ```text
/// POST   /print-spec               -> create_print_spec
/// POST   /placement-guide/{zone}   -> create_guide
/// GET    /calibration              -> get_calibration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/print-spec", post(print_spec::create_print_spec))
        .route("/placement-guide/{zone}", post(guide::create_guide))
        .route("/calibration", get(calibration::get_calibration))
}
