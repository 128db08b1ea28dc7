//! The typed customization record.
//!
//! A record maps each [`PlacementZone`] to an optional [`PlacementEntry`].
//! It is validated once, at the API boundary, and persisted verbatim on the
//! order item. After that it is never mutated.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::zone::{
    PlacementZone, IMAGE_SCALE_RANGE, RANGE_EPSILON, ROTATION_RANGE, TEXT_SCALE_RANGE,
};

/// `#RGB` or `#RRGGBB`.
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Authoring-space position, relative to the zone's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An uploaded image placed on a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageLayer {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

/// A text layer; rasterized to a bitmap before it reaches the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TextLayer {
    #[validate(length(min = 1, max = 120))]
    pub value: String,
    #[validate(length(min = 1, max = 100))]
    pub font: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}

// ---------------------------------------------------------------------------
// Placement entry
// ---------------------------------------------------------------------------

/// Everything placed on one zone.
///
/// `position`, `scale` and `rotation` are optional on the wire; missing
/// values resolve to the zone's defaults via [`PlacementEntry::resolve`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Placement parameters with every default applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPlacement {
    pub position: Position,
    pub scale: f64,
    /// Degrees.
    pub rotation: f64,
}

impl PlacementEntry {
    /// True when the zone carries neither an image nor a text layer.
    pub fn is_unused(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }

    /// Scale bounds for this entry: images are capped tighter than text.
    pub fn scale_range(&self) -> (f64, f64) {
        if self.image.is_some() {
            IMAGE_SCALE_RANGE
        } else {
            TEXT_SCALE_RANGE
        }
    }

    /// Apply per-zone defaults for missing parameters.
    pub fn resolve(&self, zone: PlacementZone) -> ResolvedPlacement {
        ResolvedPlacement {
            position: self.position.unwrap_or(Position::ORIGIN),
            scale: self.scale.unwrap_or(zone.calibration().default_scale),
            rotation: self.rotation.unwrap_or(0.0),
        }
    }

    /// Check layer contents and parameter bounds for `zone`.
    pub fn validate_for(&self, zone: PlacementZone) -> Result<(), CoreError> {
        if let Some(image) = &self.image {
            image
                .validate()
                .map_err(|e| CoreError::Validation(format!("{zone}.image: {e}")))?;
        }
        if let Some(text) = &self.text {
            text.validate()
                .map_err(|e| CoreError::Validation(format!("{zone}.text: {e}")))?;
        }

        if let Some(scale) = self.scale {
            let (min, max) = self.scale_range();
            if !scale.is_finite() || scale < min - RANGE_EPSILON || scale > max + RANGE_EPSILON {
                return Err(CoreError::Validation(format!(
                    "{zone}.scale {scale} out of range [{min}, {max}]"
                )));
            }
        }

        if let Some(rotation) = self.rotation {
            let (min, max) = ROTATION_RANGE;
            if !rotation.is_finite() || rotation < min || rotation > max {
                return Err(CoreError::Validation(format!(
                    "{zone}.rotation {rotation} out of range [{min}, {max}]"
                )));
            }
        }

        if let Some(position) = self.position {
            let range = zone.calibration().position_range;
            if !position.x.is_finite()
                || !position.y.is_finite()
                || !range.contains(position.x, position.y)
            {
                return Err(CoreError::Validation(format!(
                    "{zone}.position ({}, {}) outside authoring range +/-{} x +/-{}",
                    position.x, position.y, range.max_x, range.max_y
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Customization record
// ---------------------------------------------------------------------------

/// Per-order-item mapping of zones to placements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomizationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<PlacementEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<PlacementEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_shoulder: Option<PlacementEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_shoulder: Option<PlacementEntry>,
}

impl CustomizationRecord {
    pub fn entry(&self, zone: PlacementZone) -> Option<&PlacementEntry> {
        match zone {
            PlacementZone::Front => self.front.as_ref(),
            PlacementZone::Back => self.back.as_ref(),
            PlacementZone::LeftShoulder => self.left_shoulder.as_ref(),
            PlacementZone::RightShoulder => self.right_shoulder.as_ref(),
        }
    }

    pub fn set(&mut self, zone: PlacementZone, entry: Option<PlacementEntry>) {
        let slot = match zone {
            PlacementZone::Front => &mut self.front,
            PlacementZone::Back => &mut self.back,
            PlacementZone::LeftShoulder => &mut self.left_shoulder,
            PlacementZone::RightShoulder => &mut self.right_shoulder,
        };
        *slot = entry;
    }

    /// Zones that carry at least one layer, in canonical order.
    pub fn used_zones(&self) -> impl Iterator<Item = (PlacementZone, &PlacementEntry)> {
        PlacementZone::ALL
            .into_iter()
            .filter_map(|zone| self.entry(zone).map(|entry| (zone, entry)))
            .filter(|(_, entry)| !entry.is_unused())
    }

    /// True when no zone carries a layer. Empty records are not captured.
    pub fn is_empty(&self) -> bool {
        self.used_zones().next().is_none()
    }

    /// Validate every present entry against its zone.
    pub fn validate(&self) -> Result<(), CoreError> {
        for zone in PlacementZone::ALL {
            if let Some(entry) = self.entry(zone) {
                entry.validate_for(zone)?;
            }
        }
        Ok(())
    }

    /// Parse and validate a raw JSON payload.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CoreError> {
        let record: Self = serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("Malformed customization record: {e}")))?;
        record.validate()?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
