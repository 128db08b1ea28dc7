//! Preview rendering: text rasterization, placement guides, and the
//! screenshot capture pipeline.
//!
//! Nothing here owns a 3D engine. The engine sits behind
//! [`capture::RenderSurface`]; this crate drives it with transforms from
//! `threadmark_core::geometry`.

pub mod capture;
pub mod fonts;
pub mod guide;
pub mod raster;

pub use capture::{capture_item, capture_items, CaptureError, Decal, DecalSource, RenderSurface};
pub use fonts::{FontRegistry, FontWait};
pub use raster::{RasterError, RasterizedText, TextRasterizer};
