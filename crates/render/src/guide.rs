//! SVG placement guide.
//!
//! A flat print-space view of one zone: the printable rectangle, the
//! neckline reference, and the design square positioned and rotated from
//! the measurement converter's output. Served to staff print views by
//! the API.

use threadmark_core::customization::PlacementEntry;
use threadmark_core::measurement::{self, PrintMeasurements};
use threadmark_core::zone::PlacementZone;

use crate::raster::escape_xml;

/// Guide resolution.
pub const PX_PER_CM: f64 = 10.0;

/// Blank border around the print area.
const MARGIN_CM: f64 = 3.0;

/// Build the guide for one zone entry.
pub fn placement_guide_svg(zone: PlacementZone, entry: &PlacementEntry) -> String {
    guide_svg(zone, &measurement::measure_entry(zone, entry))
}

/// Build the guide from already converted measurements.
pub fn guide_svg(zone: PlacementZone, m: &PrintMeasurements) -> String {
    let area = zone.calibration().print_area;
    let (width, height) = canvas_size_px(zone);

    let area_x = MARGIN_CM * PX_PER_CM;
    let area_y = MARGIN_CM * PX_PER_CM;
    let area_w = area.width_cm * PX_PER_CM;
    let area_h = area.height_cm * PX_PER_CM;
    let center_x = area_x + area_w / 2.0;
    let center_y = area_y + area_h / 2.0;

    // Distance from the design center up to the neckline, minus the zone's
    // base offset, is the authored vertical offset.
    let neckline_base_cm = zone.class().neckline_offset_cm();
    let raise_cm = neckline_base_cm - m.position_from_neckline_cm;
    let design_x = center_x + m.position_from_center_cm * PX_PER_CM;
    let design_y = center_y - raise_cm * PX_PER_CM;
    let neckline_y = design_y - m.position_from_neckline_cm * PX_PER_CM;
    let half = m.design_size_cm * PX_PER_CM / 2.0;

    let label = escape_xml(&format!(
        "{} | {} | {} | {}",
        zone.label(),
        measurement::format_size(m.design_size_cm),
        measurement::format_position_description(m.position_from_center_cm),
        measurement::format_rotation(m.rotation_degrees),
    ));

    let parts = [
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        ),
        format!(
            r##"<rect x="{area_x:.1}" y="{area_y:.1}" width="{area_w:.1}" height="{area_h:.1}" fill="none" stroke="#888888" stroke-dasharray="6 4"/>"##
        ),
        format!(
            r##"<line x1="{area_x:.1}" y1="{neckline_y:.1}" x2="{:.1}" y2="{neckline_y:.1}" stroke="#3366cc" stroke-dasharray="2 2"/>"##,
            area_x + area_w,
        ),
        format!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#ff6600" fill-opacity="0.2" stroke="#ff6600" transform="rotate({} {design_x:.1} {design_y:.1})"/>"##,
            design_x - half,
            design_y - half,
            half * 2.0,
            half * 2.0,
            m.rotation_degrees,
        ),
        format!(
            r#"<text x="{area_x:.1}" y="{:.1}" font-family="sans-serif" font-size="12">{label}</text>"#,
            area_y - 8.0,
        ),
        "</svg>".to_string(),
    ];
    parts.concat()
}

/// Canvas size of a zone's guide in pixels.
pub fn canvas_size_px(zone: PlacementZone) -> (u32, u32) {
    let area = zone.calibration().print_area;
    (
        ((area.width_cm + 2.0 * MARGIN_CM) * PX_PER_CM).round() as u32,
        ((area.height_cm + 2.0 * MARGIN_CM) * PX_PER_CM).round() as u32,
    )
}
