//! Private bucket proxy.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /upload/spaces/{*key}
///
/// Streams a stored object with its content type. Keys are immutable
/// (they embed a timestamp), so responses are cacheable.
pub async fn get_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let object = state.store.get(&key).await?;
    tracing::debug!(
        key = %key,
        bytes = object.bytes.len(),
        backend = state.store.backend(),
        "Serving stored object"
    );

    Ok((
        [
            (CONTENT_TYPE, object.content_type),
            (CACHE_CONTROL, "private, max-age=31536000, immutable".to_string()),
        ],
        object.bytes,
    ))
}
