//! Print-measurement converter.
//!
//! Turns the same `(zone, position, scale, rotation)` tuple the renderer
//! uses into physical measurements for manufacturing. This module never
//! looks at model geometry or renderer state; every print view (storefront
//! and admin) calls it rather than re-deriving numbers.

use serde::Serialize;

use crate::customization::{CustomizationRecord, PlacementEntry, ResolvedPlacement};
use crate::zone::{PlacementZone, PrintArea, CM_PER_UNIT};

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

// ---------------------------------------------------------------------------
// Primitive conversions
// ---------------------------------------------------------------------------

/// Round to one decimal place, normalising `-0.0` to `0.0`.
pub fn round_to_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Centimetres to inches, rounded to 0.1 in.
pub fn cm_to_inches(cm: f64) -> f64 {
    round_to_tenth(cm / CM_PER_INCH)
}

/// Design edge length in cm: `baseSize[zone] * scale`, rounded to 0.1 cm.
pub fn design_size_cm(zone: PlacementZone, scale: f64) -> f64 {
    round_to_tenth(zone.calibration().base_size_cm * scale)
}

/// Horizontal offset from the garment center line in cm.
///
/// Positive is right of center, negative left.
pub fn position_from_center_cm(x: f64) -> f64 {
    round_to_tenth(x * CM_PER_UNIT)
}

/// Vertical distance below the neckline in cm.
pub fn position_from_neckline_cm(zone: PlacementZone, y: f64) -> f64 {
    round_to_tenth(zone.class().neckline_offset_cm() - y * CM_PER_UNIT)
}

/// Whole degrees. Halves round away from zero.
pub fn rotation_degrees(rotation: f64) -> i32 {
    rotation.round() as i32
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// The manufacturing contract for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintMeasurements {
    pub zone: PlacementZone,
    pub design_size_cm: f64,
    pub design_size_in: f64,
    pub position_from_center_cm: f64,
    pub position_from_center_in: f64,
    pub position_from_neckline_cm: f64,
    pub position_from_neckline_in: f64,
    pub rotation_degrees: i32,
}

/// Convert resolved placement parameters into print measurements.
pub fn convert(zone: PlacementZone, placement: &ResolvedPlacement) -> PrintMeasurements {
    let size_cm = design_size_cm(zone, placement.scale);
    let center_cm = position_from_center_cm(placement.position.x);
    let neckline_cm = position_from_neckline_cm(zone, placement.position.y);

    PrintMeasurements {
        zone,
        design_size_cm: size_cm,
        design_size_in: cm_to_inches(size_cm),
        position_from_center_cm: center_cm,
        position_from_center_in: cm_to_inches(center_cm),
        position_from_neckline_cm: neckline_cm,
        position_from_neckline_in: cm_to_inches(neckline_cm),
        rotation_degrees: rotation_degrees(placement.rotation),
    }
}

/// Convert a persisted entry, applying per-zone defaults for missing values.
pub fn measure_entry(zone: PlacementZone, entry: &PlacementEntry) -> PrintMeasurements {
    convert(zone, &entry.resolve(zone))
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `"Center"` when the offset is zero, otherwise e.g. `"3.5 cm (1.4 in) right of center"`.
pub fn format_position_description(position_from_center_cm: f64) -> String {
    if position_from_center_cm == 0.0 {
        return "Center".to_string();
    }
    let side = if position_from_center_cm > 0.0 { "right" } else { "left" };
    let cm = position_from_center_cm.abs();
    format!("{cm:.1} cm ({:.1} in) {side} of center", cm_to_inches(cm))
}

/// e.g. `"12.0 cm (4.7 in)"`.
pub fn format_size(size_cm: f64) -> String {
    format!("{size_cm:.1} cm ({:.1} in)", cm_to_inches(size_cm))
}

/// e.g. `"No rotation"`, `"45°"`, `"-30°"`.
pub fn format_rotation(degrees: i32) -> String {
    if degrees == 0 {
        "No rotation".to_string()
    } else {
        format!("{degrees}°")
    }
}

// ---------------------------------------------------------------------------
// Print specification
// ---------------------------------------------------------------------------

/// Text layer details copied onto the print sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpec {
    pub value: String,
    pub font: String,
    pub color: String,
}

/// Everything a print operator needs for one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePrintSpec {
    pub zone: PlacementZone,
    pub label: &'static str,
    pub print_area: PrintArea,
    pub image_url: Option<String>,
    pub text: Option<TextSpec>,
    pub measurements: PrintMeasurements,
    pub size_description: String,
    pub position_description: String,
    pub rotation_description: String,
    /// Whether the rotated design stays inside the printable area.
    pub fits_print_area: bool,
}

/// Print specification for a whole customization record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSpecification {
    pub zones: Vec<ZonePrintSpec>,
}

/// Derive the full print specification from a frozen record.
///
/// Needs nothing beyond the record and the calibration tables.
pub fn print_specification(record: &CustomizationRecord) -> PrintSpecification {
    let zones = record
        .used_zones()
        .map(|(zone, entry)| zone_print_spec(zone, entry))
        .collect();
    PrintSpecification { zones }
}

fn zone_print_spec(zone: PlacementZone, entry: &PlacementEntry) -> ZonePrintSpec {
    let placement = entry.resolve(zone);
    let measurements = convert(zone, &placement);
    let print_area = zone.calibration().print_area;

    ZonePrintSpec {
        zone,
        label: zone.label(),
        print_area,
        image_url: entry.image.as_ref().map(|i| i.url.clone()),
        text: entry.text.as_ref().map(|t| TextSpec {
            value: t.value.clone(),
            font: t.font.clone(),
            color: t.color.clone(),
        }),
        size_description: format_size(measurements.design_size_cm),
        position_description: format_position_description(measurements.position_from_center_cm),
        rotation_description: format_rotation(measurements.rotation_degrees),
        fits_print_area: fits_print_area(&print_area, &placement, measurements.design_size_cm),
        measurements,
    }
}

/// Axis-aligned half extent of a square of edge `size` rotated by `degrees`.
fn rotated_half_extent(size: f64, degrees: f64) -> f64 {
    let theta = degrees.to_radians();
    size / 2.0 * (theta.cos().abs() + theta.sin().abs())
}

/// The design is measured from the print area's center on both axes.
fn fits_print_area(area: &PrintArea, placement: &ResolvedPlacement, size_cm: f64) -> bool {
    let half = rotated_half_extent(size_cm, placement.rotation);
    let dx = (placement.position.x * CM_PER_UNIT).abs();
    let dy = (placement.position.y * CM_PER_UNIT).abs();
    // 1 mm tolerance for rounding in the displayed values.
    dx + half <= area.width_cm / 2.0 + 0.1 && dy + half <= area.height_cm / 2.0 + 0.1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customization::{ImageLayer, Position, TextLayer};

    fn placement(x: f64, y: f64, scale: f64, rotation: f64) -> ResolvedPlacement {
        ResolvedPlacement {
            position: Position::new(x, y),
            scale,
            rotation,
        }
    }

    #[test]
    fn front_centered_at_default_scale() {
        let m = convert(PlacementZone::Front, &placement(0.0, 0.0, 0.6, 0.0));
        assert_eq!(m.design_size_cm, 12.0);
        assert_eq!(m.position_from_center_cm, 0.0);
        assert_eq!(m.position_from_neckline_cm, 15.0);
        assert_eq!(m.rotation_degrees, 0);
    }

    #[test]
    fn back_rotated_forty_five() {
        let m = convert(PlacementZone::Back, &placement(0.0, 0.0, 0.5, 45.0));
        assert_eq!(m.design_size_cm, 11.0);
        assert_eq!(m.rotation_degrees, 45);
    }

    #[test]
    fn left_shoulder_full_scale() {
        let m = convert(PlacementZone::LeftShoulder, &placement(0.0, 0.0, 1.0, 0.0));
        assert_eq!(m.design_size_cm, 8.0);
        assert_eq!(m.position_from_neckline_cm, 5.0);
    }

    #[test]
    fn unit_scale_equals_base_size_for_every_zone() {
        for (zone, base) in crate::zone::BASE_SIZES {
            assert_eq!(design_size_cm(zone, 1.0), base);
        }
    }

    #[test]
    fn cm_to_inches_stays_within_a_tenth() {
        let mut cm = 0.0;
        while cm <= 100.0 {
            let exact = cm / CM_PER_INCH;
            assert!((cm_to_inches(cm) - exact).abs() <= 0.1, "{cm} cm");
            cm += 0.37;
        }
        assert_eq!(cm_to_inches(2.54), 1.0);
    }

    #[test]
    fn center_offset_preserves_sign() {
        assert_eq!(position_from_center_cm(0.0), 0.0);
        assert!(position_from_center_cm(0.031) > 0.0);
        assert!(position_from_center_cm(-0.031) < 0.0);
        assert_eq!(position_from_center_cm(-0.031), -3.1);
    }

    #[test]
    fn tiny_negative_offset_rounds_to_positive_zero() {
        let cm = position_from_center_cm(-0.0001);
        assert_eq!(cm, 0.0);
        assert!(cm.is_sign_positive());
        assert_eq!(format_position_description(cm), "Center");
    }

    #[test]
    fn neckline_offset_subtracts_vertical_position() {
        assert_eq!(position_from_neckline_cm(PlacementZone::Front, 0.05), 10.0);
        assert_eq!(position_from_neckline_cm(PlacementZone::Back, -0.1), 25.0);
        assert_eq!(position_from_neckline_cm(PlacementZone::RightShoulder, 0.02), 3.0);
    }

    #[test]
    fn rotation_rounds_to_whole_degrees() {
        assert_eq!(rotation_degrees(44.6), 45);
        assert_eq!(rotation_degrees(-12.4), -12);
        assert_eq!(rotation_degrees(-179.9), -180);
    }

    #[test]
    fn position_description_is_center_only_at_zero() {
        assert_eq!(format_position_description(0.0), "Center");
        assert_eq!(format_position_description(3.5), "3.5 cm (1.4 in) right of center");
        assert_eq!(format_position_description(-2.0), "2.0 cm (0.8 in) left of center");
        assert_ne!(format_position_description(0.1), "Center");
    }

    #[test]
    fn size_and_rotation_formatting() {
        assert_eq!(format_size(12.0), "12.0 cm (4.7 in)");
        assert_eq!(format_rotation(0), "No rotation");
        assert_eq!(format_rotation(-30), "-30°");
    }

    #[test]
    fn missing_scale_falls_back_to_zone_default() {
        let entry = PlacementEntry {
            image: Some(ImageLayer {
                url: "u".into(),
                asset_id: None,
            }),
            ..Default::default()
        };
        assert_eq!(measure_entry(PlacementZone::Front, &entry).design_size_cm, 12.0);
        assert_eq!(measure_entry(PlacementZone::Back, &entry).design_size_cm, 11.0);
        assert_eq!(measure_entry(PlacementZone::LeftShoulder, &entry).design_size_cm, 4.0);
    }

    #[test]
    fn specification_covers_used_zones_only() {
        let mut record = CustomizationRecord::default();
        record.set(
            PlacementZone::Front,
            Some(PlacementEntry {
                image: Some(ImageLayer {
                    url: "https://cdn/a.png".into(),
                    asset_id: None,
                }),
                position: Some(Position::new(0.05, 0.0)),
                scale: Some(0.6),
                rotation: Some(0.0),
                ..Default::default()
            }),
        );
        record.set(
            PlacementZone::RightShoulder,
            Some(PlacementEntry {
                text: Some(TextLayer {
                    value: "07".into(),
                    font: "Inter".into(),
                    color: "#000".into(),
                }),
                ..Default::default()
            }),
        );
        record.set(PlacementZone::Back, Some(PlacementEntry::default()));

        let spec = print_specification(&record);
        assert_eq!(spec.zones.len(), 2);
        assert_eq!(spec.zones[0].zone, PlacementZone::Front);
        assert_eq!(spec.zones[0].position_description, "5.0 cm (2.0 in) right of center");
        assert_eq!(spec.zones[0].image_url.as_deref(), Some("https://cdn/a.png"));
        assert!(spec.zones[0].fits_print_area);
        assert_eq!(spec.zones[1].text.as_ref().unwrap().value, "07");
    }

    #[test]
    fn rotated_design_can_overflow_print_area() {
        let area = PlacementZone::LeftShoulder.calibration().print_area;
        // 8 cm square rotated 45° spans ~11.3 cm, wider than the 10 cm area.
        assert!(fits_print_area(&area, &placement(0.0, 0.0, 1.0, 0.0), 8.0));
        assert!(!fits_print_area(&area, &placement(0.0, 0.0, 1.0, 45.0), 8.0));
    }
}
