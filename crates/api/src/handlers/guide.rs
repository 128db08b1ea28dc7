//! Placement guide endpoints.
//!
//! Staff print views draw each zone of a customization in print space. The
//! guide is rebuilt from the record on every request; nothing is stored.

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use threadmark_core::customization::{CustomizationRecord, PlacementEntry};
use threadmark_core::error::CoreError;
use threadmark_core::types::DbId;
use threadmark_core::zone::PlacementZone;
use threadmark_db::repositories::OrderItemRepo;
use threadmark_render::guide::placement_guide_svg;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// GET /api/v1/orders/{id}/items/{item_id}/guide/{zone}
pub async fn get_item_guide(
    State(state): State<AppState>,
    Path((order_id, item_id, zone)): Path<(DbId, DbId, String)>,
) -> AppResult<Response> {
    let zone = PlacementZone::from_name(&zone)?;
    let item = OrderItemRepo::find(&state.pool, order_id, item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "OrderItem",
            id: item_id,
        }))?;

    let entry = item
        .customization()
        .and_then(|record| used_entry(record, zone))
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Placement",
                key: format!("item {item_id} {}", zone.name()),
            })
        })?;

    Ok(svg_response(placement_guide_svg(zone, entry)))
}

/// POST /api/v1/placement-guide/{zone}
///
/// Body is a customization record, as for `/print-spec`.
pub async fn create_guide(
    Path(zone): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Response> {
    let zone = PlacementZone::from_name(&zone)?;
    let record = CustomizationRecord::from_json(body)?;
    let entry = used_entry(&record, zone).ok_or_else(|| {
        AppError::BadRequest(format!("Record has no {} placement", zone.name()))
    })?;

    Ok(svg_response(placement_guide_svg(zone, entry)))
}

fn used_entry(record: &CustomizationRecord, zone: PlacementZone) -> Option<&PlacementEntry> {
    record.entry(zone).filter(|entry| !entry.is_unused())
}

fn svg_response(svg: String) -> Response {
    ([(CONTENT_TYPE, SVG_CONTENT_TYPE)], svg).into_response()
}
