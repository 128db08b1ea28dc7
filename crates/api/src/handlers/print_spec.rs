//! Stateless print specification endpoint.

use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use threadmark_core::customization::CustomizationRecord;
use threadmark_core::measurement::print_specification;

use crate::error::AppResult;
use crate::response::DataResponse;

/// POST /api/v1/print-spec
///
/// Body is a customization record; responds with its print specification.
/// Malformed or out-of-range records are rejected with 400.
pub async fn create_print_spec(Json(body): Json<Value>) -> AppResult<impl IntoResponse> {
    let record = CustomizationRecord::from_json(body)?;
    Ok(Json(DataResponse {
        data: print_specification(&record),
    }))
}
