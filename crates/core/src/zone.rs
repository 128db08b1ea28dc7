//! Placement zones and their calibration tables.
//!
//! Every constant here is empirically calibrated against the reference
//! garment. The geometry resolver, the print-measurement converter and the
//! placement guide all read from these tables; nothing else may hard-code
//! a per-zone number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// One of the four garment regions a design can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementZone {
    Front,
    Back,
    LeftShoulder,
    RightShoulder,
}

impl PlacementZone {
    /// All zones in canonical order.
    pub const ALL: [PlacementZone; 4] = [
        PlacementZone::Front,
        PlacementZone::Back,
        PlacementZone::LeftShoulder,
        PlacementZone::RightShoulder,
    ];

    /// Wire name (matches the customization record JSON keys).
    pub fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
        }
    }

    /// Human-readable label for print sheets.
    pub fn label(self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Back => "Back",
            Self::LeftShoulder => "Left Shoulder",
            Self::RightShoulder => "Right Shoulder",
        }
    }

    /// Parse from the wire name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|z| z.name() == name)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown placement zone '{name}'. \
                     Must be one of: front, back, leftShoulder, rightShoulder"
                ))
            })
    }

    pub fn class(self) -> ZoneClass {
        match self {
            Self::Front | Self::Back => ZoneClass::Torso,
            Self::LeftShoulder | Self::RightShoulder => ZoneClass::Shoulder,
        }
    }

    /// Calibration constants for this zone.
    pub fn calibration(self) -> &'static ZoneCalibration {
        match self {
            Self::Front => &FRONT,
            Self::Back => &BACK,
            Self::LeftShoulder => &LEFT_SHOULDER,
            Self::RightShoulder => &RIGHT_SHOULDER,
        }
    }
}

impl fmt::Display for PlacementZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Torso zones and shoulder zones sit at different heights on the garment
/// and use different reference offsets and footprint factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneClass {
    Torso,
    Shoulder,
}

impl ZoneClass {
    /// Distance (cm) from the neckline to the zone's reference point.
    pub fn neckline_offset_cm(self) -> f64 {
        match self {
            Self::Torso => TORSO_NECKLINE_OFFSET_CM,
            Self::Shoulder => SHOULDER_NECKLINE_OFFSET_CM,
        }
    }

    /// Fraction of `min(modelWidth, modelHeight)` covered at scale 1.0.
    pub fn footprint_factor(self) -> f64 {
        match self {
            Self::Torso => 0.3,
            Self::Shoulder => 0.2,
        }
    }
}

// ---------------------------------------------------------------------------
// Calibration tables
// ---------------------------------------------------------------------------

/// Centimetres per authoring unit.
pub const CM_PER_UNIT: f64 = 100.0;

/// Neckline reference offset for torso zones (cm).
pub const TORSO_NECKLINE_OFFSET_CM: f64 = 15.0;

/// Neckline reference offset for shoulder zones (cm).
pub const SHOULDER_NECKLINE_OFFSET_CM: f64 = 5.0;

/// Scale bounds when the entry carries an image layer.
pub const IMAGE_SCALE_RANGE: (f64, f64) = (0.2, 1.0);

/// Scale bounds for text-only entries.
pub const TEXT_SCALE_RANGE: (f64, f64) = (0.1, 2.0);

/// Rotation bounds in degrees.
pub const ROTATION_RANGE: (f64, f64) = (-180.0, 180.0);

/// Printable area of a zone in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintArea {
    pub width_cm: f64,
    pub height_cm: f64,
}

/// Symmetric authoring range: `x in [-max_x, max_x]`, `y in [-max_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRange {
    pub max_x: f64,
    pub max_y: f64,
}

impl PositionRange {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.max_x + RANGE_EPSILON && y.abs() <= self.max_y + RANGE_EPSILON
    }

    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(-self.max_x, self.max_x), y.clamp(-self.max_y, self.max_y))
    }
}

/// Tolerance for float noise coming from slider input.
pub(crate) const RANGE_EPSILON: f64 = 1e-9;

/// Fixed per-zone constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneCalibration {
    pub print_area: PrintArea,
    /// Design edge length in cm at scale 1.0.
    pub base_size_cm: f64,
    pub position_range: PositionRange,
    /// Scale used when a persisted entry carries none.
    pub default_scale: f64,
}

const FRONT: ZoneCalibration = ZoneCalibration {
    print_area: PrintArea {
        width_cm: 30.0,
        height_cm: 40.0,
    },
    base_size_cm: 20.0,
    position_range: PositionRange {
        max_x: 0.15,
        max_y: 0.20,
    },
    default_scale: 0.6,
};

const BACK: ZoneCalibration = ZoneCalibration {
    print_area: PrintArea {
        width_cm: 30.0,
        height_cm: 45.0,
    },
    base_size_cm: 22.0,
    position_range: PositionRange {
        max_x: 0.15,
        max_y: 0.22,
    },
    default_scale: 0.5,
};

const LEFT_SHOULDER: ZoneCalibration = ZoneCalibration {
    print_area: PrintArea {
        width_cm: 10.0,
        height_cm: 10.0,
    },
    base_size_cm: 8.0,
    position_range: PositionRange {
        max_x: 0.05,
        max_y: 0.05,
    },
    default_scale: 0.5,
};

const RIGHT_SHOULDER: ZoneCalibration = LEFT_SHOULDER;

/// Print areas keyed by zone.
pub const PRINT_AREAS: [(PlacementZone, PrintArea); 4] = [
    (PlacementZone::Front, FRONT.print_area),
    (PlacementZone::Back, BACK.print_area),
    (PlacementZone::LeftShoulder, LEFT_SHOULDER.print_area),
    (PlacementZone::RightShoulder, RIGHT_SHOULDER.print_area),
];

/// Base design sizes (cm at scale 1.0) keyed by zone.
pub const BASE_SIZES: [(PlacementZone, f64); 4] = [
    (PlacementZone::Front, FRONT.base_size_cm),
    (PlacementZone::Back, BACK.base_size_cm),
    (PlacementZone::LeftShoulder, LEFT_SHOULDER.base_size_cm),
    (PlacementZone::RightShoulder, RIGHT_SHOULDER.base_size_cm),
];

// ---------------------------------------------------------------------------
// Serializable table (shared with every client)
// ---------------------------------------------------------------------------

/// One row of the calibration table as served to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCalibrationEntry {
    pub zone: PlacementZone,
    pub label: &'static str,
    pub class: ZoneClass,
    pub print_area: PrintArea,
    pub base_size_cm: f64,
    pub position_range: PositionRange,
    pub default_scale: f64,
    pub neckline_offset_cm: f64,
}

/// The full calibration table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationTable {
    pub cm_per_unit: f64,
    pub zones: Vec<ZoneCalibrationEntry>,
}

pub fn calibration_table() -> CalibrationTable {
    let zones = PlacementZone::ALL
        .into_iter()
        .map(|zone| {
            let cal = zone.calibration();
            ZoneCalibrationEntry {
                zone,
                label: zone.label(),
                class: zone.class(),
                print_area: cal.print_area,
                base_size_cm: cal.base_size_cm,
                position_range: cal.position_range,
                default_scale: cal.default_scale,
                neckline_offset_cm: zone.class().neckline_offset_cm(),
            }
        })
        .collect();

    CalibrationTable {
        cm_per_unit: CM_PER_UNIT,
        zones,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
