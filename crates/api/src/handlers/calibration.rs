use axum::response::IntoResponse;
use axum::Json;
use threadmark_core::zone::calibration_table;

use crate::response::DataResponse;

/// GET /api/v1/calibration
///
/// The shared zone calibration table: print areas, base sizes, authoring
/// ranges and neckline offsets.
pub async fn get_calibration() -> impl IntoResponse {
    Json(DataResponse {
        data: calibration_table(),
    })
}
