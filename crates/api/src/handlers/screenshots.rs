//! Handlers for attaching preview screenshots to order items.
//!
//! Upload happens after the order exists. Each item accepts exactly one
//! attach; whatever views uploaded successfully are what get attached.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use threadmark_core::error::CoreError;
use threadmark_core::screenshots::ScreenshotSet;
use threadmark_core::types::DbId;
use threadmark_db::models::order::{Order, OrderItem};
use threadmark_db::repositories::{OrderItemRepo, OrderRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::{discard_uploads, upload_views, ScreenshotPayload, UploadTarget};

/// Upper bound on items in one batch request.
const MAX_BATCH_ITEMS: usize = 100;

/// One item in a batch upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub item_id: DbId,
    pub screenshots: ScreenshotPayload,
}

/// Batch upload request body.
#[derive(Debug, Deserialize)]
pub struct BatchUploadRequest {
    pub items: Vec<BatchItem>,
}

/// POST /api/v1/orders/{order_id}/items/{item_id}/screenshots
///
/// Responds with the view keys that were persisted, mapped to their URLs.
pub async fn upload_item_screenshots(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(DbId, DbId)>,
    Json(payload): Json<ScreenshotPayload>,
) -> AppResult<impl IntoResponse> {
    let order = find_order(&state, order_id).await?;
    let attached = attach(&state, &order, item_id, &payload).await?;

    Ok(Json(DataResponse { data: attached }))
}

/// POST /api/v1/orders/{order_id}/screenshots
///
/// Items are processed one after another. A missing, repeated or already
/// attached item is logged and skipped; the batch itself still succeeds. Responds
/// with `itemId -> persisted URLs` for every attached item.
pub async fn upload_batch_screenshots(
    State(state): State<AppState>,
    Path(order_id): Path<DbId>,
    Json(input): Json<BatchUploadRequest>,
) -> AppResult<impl IntoResponse> {
    if input.items.len() > MAX_BATCH_ITEMS {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_BATCH_ITEMS} items per batch"
        )));
    }

    let order = find_order(&state, order_id).await?;

    let mut results: BTreeMap<DbId, ScreenshotSet> = BTreeMap::new();
    for entry in &input.items {
        match attach(&state, &order, entry.item_id, &entry.screenshots).await {
            Ok(set) => {
                results.insert(entry.item_id, set);
            }
            Err(AppError::Core(e @ (CoreError::Conflict(_) | CoreError::NotFound { .. }))) => {
                tracing::warn!(
                    order_id,
                    item_id = entry.item_id,
                    reason = %e,
                    "Batch item skipped"
                );
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        order_id,
        requested = input.items.len(),
        attached = results.len(),
        "Batch screenshot upload finished",
    );

    Ok(Json(DataResponse { data: results }))
}

async fn find_order(state: &AppState, order_id: DbId) -> AppResult<Order> {
    OrderRepo::find_by_id(&state.pool, order_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id: order_id,
        }))
}

/// Upload the payload's views and attach the successful ones to the item.
///
/// The item is re-read right before uploading so a repeated item in one
/// batch is refused without writing blobs. If another request attaches
/// first, the blobs written here are deleted again.
async fn attach(
    state: &AppState,
    order: &Order,
    item_id: DbId,
    payload: &ScreenshotPayload,
) -> AppResult<ScreenshotSet> {
    let item = find_item(state, order.id, item_id).await?;
    if item.screenshots_attached_at.is_some() {
        return Err(already_attached(item.id));
    }

    let target = UploadTarget {
        base_folder: state.base_folder(),
        order_number: &order.order_number,
        item_index: usize::try_from(item.position).unwrap_or_default(),
        timestamp_ms: Utc::now().timestamp_millis(),
    };
    let outcome = upload_views(state.store.as_ref(), target, payload).await;

    let attached =
        OrderItemRepo::attach_screenshots(&state.pool, order.id, item.id, &outcome.uploaded).await;
    let updated = match attached {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            discard_uploads(state.store.as_ref(), &outcome).await;
            return Err(already_attached(item.id));
        }
        Err(e) => {
            discard_uploads(state.store.as_ref(), &outcome).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        order_id = order.id,
        item_id = item.id,
        uploaded = outcome.uploaded.count(),
        failed = outcome.failed.len(),
        "Screenshots attached",
    );

    Ok(updated.screenshot_set().cloned().unwrap_or_default())
}

async fn find_item(state: &AppState, order_id: DbId, item_id: DbId) -> AppResult<OrderItem> {
    OrderItemRepo::find(&state.pool, order_id, item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "OrderItem",
            id: item_id,
        }))
}

fn already_attached(item_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Screenshots already attached to order item {item_id}"
    )))
}
