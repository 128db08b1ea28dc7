//! Screenshot upload pipeline.
//!
//! The views of one item are decoded, checked and uploaded concurrently.
//! A failed view is logged and left out; its siblings still persist. There
//! is no retry.

use futures::future::join_all;
use image::ImageFormat;
use serde::Serialize;
use threadmark_core::error::CoreError;
use threadmark_core::screenshots::{
    decode_png_data_url, screenshot_key, ScreenshotSet, ScreenshotView, ViewMap,
};
use threadmark_storage::{proxy_url, ObjectStore, StorageError};

const PNG_CONTENT_TYPE: &str = "image/png";

/// Upload request body for one item: view name to PNG data URL.
pub type ScreenshotPayload = ViewMap<String>;

/// Where one item's screenshots go.
#[derive(Debug, Clone, Copy)]
pub struct UploadTarget<'a> {
    pub base_folder: &'a str,
    pub order_number: &'a str,
    /// Zero-based item position within the order.
    pub item_index: usize,
    pub timestamp_ms: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewUploadError {
    #[error(transparent)]
    Decode(#[from] CoreError),

    #[error("Payload is not a PNG image")]
    NotPng,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A view that could not be persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FailedView {
    pub view: ScreenshotView,
    pub reason: String,
}

/// Result of uploading one item's views.
#[derive(Debug, Clone, Default)]
pub struct UploadOutcome {
    pub uploaded: ScreenshotSet,
    pub failed: Vec<FailedView>,
    /// Storage keys written, for cleanup if the attach is refused.
    pub keys: Vec<String>,
}

/// Upload every present view of `payload` concurrently.
pub async fn upload_views(
    store: &dyn ObjectStore,
    target: UploadTarget<'_>,
    payload: &ScreenshotPayload,
) -> UploadOutcome {
    let uploads = payload.iter().map(|(view, data_url)| async move {
        let result = upload_view(store, target, view, data_url).await;
        (view, result)
    });

    let mut outcome = UploadOutcome::default();
    for (view, result) in join_all(uploads).await {
        match result {
            Ok(key) => {
                outcome.uploaded.set(view, Some(proxy_url(&key)));
                outcome.keys.push(key);
            }
            Err(e) => {
                tracing::warn!(
                    order_number = target.order_number,
                    item_index = target.item_index,
                    %view,
                    error = %e,
                    "Screenshot upload failed",
                );
                outcome.failed.push(FailedView {
                    view,
                    reason: e.to_string(),
                });
            }
        }
    }
    outcome
}

async fn upload_view(
    store: &dyn ObjectStore,
    target: UploadTarget<'_>,
    view: ScreenshotView,
    data_url: &str,
) -> Result<String, ViewUploadError> {
    let bytes = decode_png_data_url(data_url)?;
    if image::guess_format(&bytes).ok() != Some(ImageFormat::Png) {
        return Err(ViewUploadError::NotPng);
    }

    let key = screenshot_key(
        target.base_folder,
        target.order_number,
        target.item_index,
        view,
        target.timestamp_ms,
    );
    store.put(&key, bytes, PNG_CONTENT_TYPE).await?;
    Ok(key)
}

/// Delete objects written by an upload that was never attached.
pub async fn discard_uploads(store: &dyn ObjectStore, outcome: &UploadOutcome) {
    let deletions = outcome.keys.iter().map(|key| async move {
        if let Err(e) = store.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete orphaned screenshot");
        }
    });
    join_all(deletions).await;
}

#[cfg(test)]
mod tests {
    use threadmark_core::screenshots::encode_png_data_url;
    use threadmark_storage::MemoryStore;

    use super::*;

    /// Smallest valid PNG header; enough for format sniffing.
    const PNG_HEADER: [u8; 16] = [
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ];

    fn target() -> UploadTarget<'static> {
        UploadTarget {
            base_folder: "test",
            order_number: "ORD-20260101-ABCDEF12",
            item_index: 1,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn uploads_present_views_under_item_prefix() {
        let store = MemoryStore::new();
        let png = encode_png_data_url(&PNG_HEADER);
        let payload: ScreenshotPayload = [
            (ScreenshotView::Front, png.clone()),
            (ScreenshotView::Right, png),
        ]
        .into_iter()
        .collect();

        let outcome = upload_views(&store, target(), &payload).await;

        assert!(outcome.failed.is_empty());
        assert_eq!(
            outcome.uploaded.front.as_deref(),
            Some("/upload/spaces/test/orders/ORD-20260101-ABCDEF12/item-1/front-1700000000000.png")
        );
        assert!(outcome.uploaded.back.is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn bad_views_fail_alone() {
        let store = MemoryStore::new();
        let payload = ScreenshotPayload {
            front: Some(encode_png_data_url(&PNG_HEADER)),
            back: Some("data:image/jpeg;base64,AAAA".into()),
            left: Some(encode_png_data_url(b"GIF89a not a png")),
            right: None,
        };

        let outcome = upload_views(&store, target(), &payload).await;

        assert_eq!(outcome.uploaded.count(), 1);
        assert_eq!(outcome.keys.len(), 1);
        let failed: Vec<_> = outcome.failed.iter().map(|f| f.view).collect();
        assert_eq!(failed, vec![ScreenshotView::Back, ScreenshotView::Left]);
    }

    #[tokio::test]
    async fn discard_removes_every_written_object() {
        let store = MemoryStore::new();
        let png = encode_png_data_url(&PNG_HEADER);
        let payload = ScreenshotPayload {
            front: Some(png.clone()),
            back: Some(png.clone()),
            left: Some(png),
            right: None,
        };

        let outcome = upload_views(&store, target(), &payload).await;
        assert_eq!(store.len().await, 3);

        discard_uploads(&store, &outcome).await;

        assert!(store.is_empty().await);
    }
}
