//! Screenshot sets, per-item asset status, and the storage key layout.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Prefix every accepted screenshot data URL must carry.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One of the four fixed camera orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotView {
    Front,
    Back,
    Left,
    Right,
}

impl ScreenshotView {
    pub const ALL: [ScreenshotView; 4] = [
        ScreenshotView::Front,
        ScreenshotView::Back,
        ScreenshotView::Left,
        ScreenshotView::Right,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Camera yaw around the garment, in degrees.
    pub fn camera_yaw_degrees(self) -> f64 {
        match self {
            Self::Front => 0.0,
            Self::Back => 180.0,
            Self::Left => -90.0,
            Self::Right => 90.0,
        }
    }
}

impl fmt::Display for ScreenshotView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Screenshot set
// ---------------------------------------------------------------------------

/// Four independently optional values keyed by view.
///
/// Used with `String` URLs for persisted sets and with data URLs for upload
/// request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewMap<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<T>,
}

/// Persisted screenshot URLs for one order item.
pub type ScreenshotSet = ViewMap<String>;

impl<T> ViewMap<T> {
    pub fn get(&self, view: ScreenshotView) -> Option<&T> {
        match view {
            ScreenshotView::Front => self.front.as_ref(),
            ScreenshotView::Back => self.back.as_ref(),
            ScreenshotView::Left => self.left.as_ref(),
            ScreenshotView::Right => self.right.as_ref(),
        }
    }

    pub fn set(&mut self, view: ScreenshotView, value: Option<T>) {
        let slot = match view {
            ScreenshotView::Front => &mut self.front,
            ScreenshotView::Back => &mut self.back,
            ScreenshotView::Left => &mut self.left,
            ScreenshotView::Right => &mut self.right,
        };
        *slot = value;
    }

    /// Present values in canonical view order.
    pub fn iter(&self) -> impl Iterator<Item = (ScreenshotView, &T)> {
        ScreenshotView::ALL
            .into_iter()
            .filter_map(move |view| self.get(view).map(|v| (view, v)))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl<T> FromIterator<(ScreenshotView, T)> for ViewMap<T> {
    fn from_iter<I: IntoIterator<Item = (ScreenshotView, T)>>(iter: I) -> Self {
        let mut map = ViewMap {
            front: None,
            back: None,
            left: None,
            right: None,
        };
        for (view, value) in iter {
            map.set(view, Some(value));
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Asset status
// ---------------------------------------------------------------------------

/// Per-order-item screenshot lifecycle:
/// `no-screenshots -> captured(0..4) -> persisted(0..4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum AssetStatus {
    NoScreenshots,
    Captured { count: u8 },
    Persisted { count: u8 },
}

impl AssetStatus {
    /// Record a capture of `count` views.
    pub fn capture(self, count: usize) -> Result<Self, CoreError> {
        match self {
            Self::NoScreenshots if count <= ScreenshotView::ALL.len() => {
                Ok(Self::Captured { count: count as u8 })
            }
            Self::NoScreenshots => Err(CoreError::Validation(format!(
                "Cannot capture {count} views; at most 4 exist"
            ))),
            other => Err(CoreError::Conflict(format!("Cannot capture from state {other:?}"))),
        }
    }

    /// Record that `count` of the captured views were persisted.
    pub fn persist(self, count: usize) -> Result<Self, CoreError> {
        match self {
            Self::Captured { count: captured } if count <= captured as usize => {
                Ok(Self::Persisted { count: count as u8 })
            }
            Self::Captured { count: captured } => Err(CoreError::Validation(format!(
                "Cannot persist {count} views when only {captured} were captured"
            ))),
            other => Err(CoreError::Conflict(format!("Cannot persist from state {other:?}"))),
        }
    }

    /// Status of an item as seen from persistence.
    ///
    /// An attached set, even an empty one, is terminal.
    pub fn from_attached(set: Option<&ScreenshotSet>) -> Self {
        match set {
            Some(set) => Self::Persisted { count: set.count() as u8 },
            None => Self::NoScreenshots,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Persisted { .. })
    }

    pub fn is_complete(self) -> bool {
        self == Self::Persisted { count: ScreenshotView::ALL.len() as u8 }
    }
}

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

/// `{baseFolder}/orders/{orderNumber}/item-{index}/{view}-{timestamp}.png`.
///
/// An empty base folder drops the leading segment.
pub fn screenshot_key(
    base_folder: &str,
    order_number: &str,
    item_index: usize,
    view: ScreenshotView,
    timestamp_ms: i64,
) -> String {
    let base = base_folder.trim_matches('/');
    let tail = format!("orders/{order_number}/item-{item_index}/{view}-{timestamp_ms}.png");
    if base.is_empty() {
        tail
    } else {
        format!("{base}/{tail}")
    }
}

// ---------------------------------------------------------------------------
// Data URLs
// ---------------------------------------------------------------------------

/// Decode a `data:image/png;base64,...` URL into raw bytes.
pub fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, CoreError> {
    let payload = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| CoreError::Validation("Screenshot must be a PNG data URL".into()))?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(CoreError::Validation("Screenshot payload is empty".into()));
    }
    Ok(bytes)
}

/// Encode PNG bytes as a data URL.
pub fn encode_png_data_url(bytes: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
