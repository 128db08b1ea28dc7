//! Placement geometry resolver.
//!
//! Converts authoring-space placement parameters into a decal transform in
//! the garment model's own coordinate space. This is the only place that
//! knows where a zone sits on the model; 3D preview adapters go through
//! [`resolve_placement`]. The print-space SVG guide is drawn from
//! `measurement` instead.
//!
//! Coordinate conventions: `+y` is up, `+z` points out of the garment front,
//! `+x` is the right-hand side as seen from the front camera, so
//! `leftShoulder` sits at `-x` and `rightShoulder` at `+x`. Euler angles are
//! radians in XYZ order.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::Serialize;

use crate::customization::{PlacementEntry, ResolvedPlacement};
use crate::error::CoreError;
use crate::zone::PlacementZone;

// ---------------------------------------------------------------------------
// Model-space calibration
// ---------------------------------------------------------------------------

/// Vertical offset from the model center to chest height (torso zones).
pub const CHEST_HEIGHT_OFFSET: f64 = 0.10;

/// How far the torso decal sits inside the front/back extent.
pub const SURFACE_INSET: f64 = 0.05;

/// Lateral distance from the model center to the shoulder anchor.
pub const SHOULDER_LATERAL_OFFSET: f64 = 0.18;

/// Vertical offset from the model center to the shoulder anchor.
pub const SHOULDER_VERTICAL_OFFSET: f64 = 0.25;

/// Extra offset applied to text layers so they render in front of an image
/// layer on the same zone.
pub const TEXT_LAYER_Z_OFFSET: f64 = 0.001;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box of the loaded garment geometry.
///
/// Computed once per loaded model; callers cache it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelBounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl ModelBounds {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Result<Self, CoreError> {
        let finite = min.iter().chain(max.iter()).all(|v| v.is_finite());
        if !finite || min.x >= max.x || min.y >= max.y || min.z >= max.z {
            return Err(CoreError::Validation(format!(
                "Degenerate model bounds: min {min:?}, max {max:?}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Bounding box of a vertex cloud. `None` for fewer than two distinct
    /// extents on any axis.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });
        Self::new(min, max).ok()
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// `min(width, height)`, the reference length for decal footprints.
    pub fn reference_length(&self) -> f64 {
        let size = self.size();
        size.x.min(size.y)
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Decal transform, ready for a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecalTransform {
    #[serde(rename = "position3D")]
    pub position: Vector3<f64>,
    /// Euler angles (radians, XYZ order).
    #[serde(rename = "rotation3D")]
    pub rotation: Vector3<f64>,
    #[serde(rename = "scale3D")]
    pub scale: Vector3<f64>,
}

impl DecalTransform {
    /// Rotation as a matrix: yaw about `+y`, then roll about the decal normal.
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z)
    }

    /// Direction the decal projects along (its local `+z`), in model space.
    pub fn projection_normal(&self) -> Vector3<f64> {
        self.rotation_matrix() * Vector3::z()
    }

    /// Full translation * rotation * scale matrix.
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation_matrix().to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// Yaw about the vertical axis that turns the decal to face out of `zone`.
pub fn zone_yaw(zone: PlacementZone) -> f64 {
    match zone {
        PlacementZone::Front => 0.0,
        PlacementZone::Back => PI,
        PlacementZone::LeftShoulder => -FRAC_PI_2,
        PlacementZone::RightShoulder => FRAC_PI_2,
    }
}

/// Unit vector pointing out of the garment surface at `zone`.
pub fn outward_normal(zone: PlacementZone) -> Vector3<f64> {
    match zone {
        PlacementZone::Front => Vector3::z(),
        PlacementZone::Back => -Vector3::z(),
        PlacementZone::LeftShoulder => -Vector3::x(),
        PlacementZone::RightShoulder => Vector3::x(),
    }
}

/// Edge length of the decal footprint in model units.
pub fn footprint(zone: PlacementZone, scale: f64, bounds: &ModelBounds) -> f64 {
    scale * bounds.reference_length() * zone.class().footprint_factor()
}

/// Resolve a placement into a decal transform.
///
/// Pure: identical inputs always produce an identical transform.
pub fn resolve_placement(
    zone: PlacementZone,
    placement: &ResolvedPlacement,
    bounds: &ModelBounds,
    z_offset: f64,
) -> DecalTransform {
    let center = bounds.center();
    let pos = placement.position;

    let anchor = match zone {
        PlacementZone::Front => Vector3::new(
            center.x + pos.x,
            center.y + CHEST_HEIGHT_OFFSET + pos.y,
            bounds.max.z - SURFACE_INSET,
        ),
        PlacementZone::Back => Vector3::new(
            center.x + pos.x,
            center.y + CHEST_HEIGHT_OFFSET + pos.y,
            bounds.min.z + SURFACE_INSET,
        ),
        PlacementZone::LeftShoulder => Vector3::new(
            center.x - SHOULDER_LATERAL_OFFSET,
            center.y + SHOULDER_VERTICAL_OFFSET + pos.y,
            center.z + pos.x,
        ),
        PlacementZone::RightShoulder => Vector3::new(
            center.x + SHOULDER_LATERAL_OFFSET,
            center.y + SHOULDER_VERTICAL_OFFSET + pos.y,
            center.z + pos.x,
        ),
    };

    let size = footprint(zone, placement.scale, bounds);

    DecalTransform {
        position: anchor + outward_normal(zone) * z_offset,
        rotation: Vector3::new(0.0, zone_yaw(zone), placement.rotation.to_radians()),
        scale: Vector3::new(size, size, size),
    }
}

/// Which layer of a zone a transform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Image,
    Text,
}

/// Resolve every layer of an entry. The text layer is pushed slightly
/// outward so it never z-fights with the image beneath it.
pub fn resolve_entry(
    zone: PlacementZone,
    entry: &PlacementEntry,
    bounds: &ModelBounds,
) -> Vec<(LayerKind, DecalTransform)> {
    let placement = entry.resolve(zone);
    let mut layers = Vec::with_capacity(2);
    if entry.image.is_some() {
        layers.push((LayerKind::Image, resolve_placement(zone, &placement, bounds, 0.0)));
    }
    if entry.text.is_some() {
        layers.push((
            LayerKind::Text,
            resolve_placement(zone, &placement, bounds, TEXT_LAYER_Z_OFFSET),
        ));
    }
    layers
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
