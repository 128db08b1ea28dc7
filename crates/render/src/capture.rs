//! Screenshot capture over a render surface.
//!
//! Capture is sequential: one surface, one item at a time, four fixed
//! camera views per item. A failure on one item is logged and leaves that
//! item without screenshots; the remaining items are still captured.

use threadmark_core::customization::CustomizationRecord;
use threadmark_core::geometry::{resolve_entry, DecalTransform, LayerKind, ModelBounds};
use threadmark_core::screenshots::{ScreenshotView, ViewMap};
use threadmark_core::zone::PlacementZone;

use crate::raster::{RasterError, TextRasterizer};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG bytes per captured view.
pub type CapturedViews = ViewMap<Vec<u8>>;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Render surface error: {0}")]
    Surface(String),

    #[error("Text rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("View {0} produced no PNG data")]
    EmptyFrame(ScreenshotView),
}

/// Where a decal's pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DecalSource {
    /// An uploaded image, loaded by the surface.
    Url(String),
    /// A rasterized text layer.
    Png(Vec<u8>),
}

/// One projected layer, ready for the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    pub zone: PlacementZone,
    pub kind: LayerKind,
    pub source: DecalSource,
    pub transform: DecalTransform,
}

/// A 3D preview that can project decals and read back frames.
pub trait RenderSurface: Send {
    /// Bounds of the loaded garment model.
    fn model_bounds(&self) -> ModelBounds;

    /// Remove every applied decal.
    fn clear_decals(&mut self);

    fn apply_decal(&mut self, decal: &Decal) -> Result<(), CaptureError>;

    /// Move the camera to a fixed view orientation.
    fn set_view(&mut self, view: ScreenshotView) -> Result<(), CaptureError>;

    /// Force a render and read the frame back as PNG.
    fn render_png(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Resolve every layer of a record into decals.
///
/// Text layers are rasterized first and then placed exactly like images.
pub async fn prepare_decals(
    record: &CustomizationRecord,
    bounds: &ModelBounds,
    rasterizer: &TextRasterizer,
) -> Result<Vec<Decal>, CaptureError> {
    let mut decals = Vec::new();
    for (zone, entry) in record.used_zones() {
        for (kind, transform) in resolve_entry(zone, entry, bounds) {
            let source = match kind {
                LayerKind::Image => match &entry.image {
                    Some(image) => DecalSource::Url(image.url.clone()),
                    None => continue,
                },
                LayerKind::Text => match &entry.text {
                    Some(text) => DecalSource::Png(rasterizer.rasterize(text).await?.png),
                    None => continue,
                },
            };
            decals.push(Decal {
                zone,
                kind,
                source,
                transform,
            });
        }
    }
    Ok(decals)
}

/// Capture the four views of one customized item.
pub async fn capture_item<S: RenderSurface>(
    surface: &mut S,
    rasterizer: &TextRasterizer,
    record: &CustomizationRecord,
) -> Result<CapturedViews, CaptureError> {
    let decals = prepare_decals(record, &surface.model_bounds(), rasterizer).await?;

    surface.clear_decals();
    for decal in &decals {
        surface.apply_decal(decal)?;
    }

    let mut views = CapturedViews::default();
    for view in ScreenshotView::ALL {
        surface.set_view(view)?;
        let png = surface.render_png()?;
        if !png.starts_with(&PNG_SIGNATURE) {
            return Err(CaptureError::EmptyFrame(view));
        }
        views.set(view, Some(png));
    }
    Ok(views)
}

/// Capture every item in order.
///
/// Returns one slot per input record. Items without layers are skipped and
/// failed items are logged; both yield `None`.
pub async fn capture_items<'a, S, I>(
    surface: &mut S,
    rasterizer: &TextRasterizer,
    records: I,
) -> Vec<Option<CapturedViews>>
where
    S: RenderSurface,
    I: IntoIterator<Item = &'a CustomizationRecord>,
{
    let mut results = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        if record.is_empty() {
            results.push(None);
            continue;
        }
        match capture_item(surface, rasterizer, record).await {
            Ok(views) => {
                tracing::debug!(index, views = views.count(), "Item captured");
                results.push(Some(views));
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Screenshot capture failed, continuing");
                surface.clear_decals();
                results.push(None);
            }
        }
    }
    if let Err(e) = surface.set_view(ScreenshotView::Front) {
        tracing::debug!(error = %e, "Could not restore front view");
    }
    results
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::Point3;
    use threadmark_core::customization::{ImageLayer, PlacementEntry, TextLayer};

    use super::*;
    use crate::fonts::FontRegistry;

    fn png_frame() -> Vec<u8> {
        tiny_skia::Pixmap::new(4, 4).unwrap().encode_png().unwrap()
    }

    #[derive(Default)]
    struct FakeSurface {
        decals: Vec<Decal>,
        views: Vec<ScreenshotView>,
        current: Option<ScreenshotView>,
        fail_view: Option<ScreenshotView>,
        fail_once: bool,
    }

    impl RenderSurface for FakeSurface {
        fn model_bounds(&self) -> ModelBounds {
            ModelBounds::new(Point3::new(-0.5, 0.0, -0.2), Point3::new(0.5, 1.4, 0.2)).unwrap()
        }

        fn clear_decals(&mut self) {
            self.decals.clear();
        }

        fn apply_decal(&mut self, decal: &Decal) -> Result<(), CaptureError> {
            self.decals.push(decal.clone());
            Ok(())
        }

        fn set_view(&mut self, view: ScreenshotView) -> Result<(), CaptureError> {
            if self.fail_view == Some(view) {
                if self.fail_once {
                    self.fail_view = None;
                }
                return Err(CaptureError::Surface("context lost".into()));
            }
            self.current = Some(view);
            self.views.push(view);
            Ok(())
        }

        fn render_png(&mut self) -> Result<Vec<u8>, CaptureError> {
            Ok(png_frame())
        }
    }

    fn rasterizer() -> TextRasterizer {
        TextRasterizer::new(Arc::new(FontRegistry::new()))
    }

    fn image_record() -> CustomizationRecord {
        let mut record = CustomizationRecord::default();
        record.set(
            PlacementZone::Front,
            Some(PlacementEntry {
                image: Some(ImageLayer {
                    url: "https://cdn.example.com/logo.png".into(),
                    asset_id: None,
                }),
                ..PlacementEntry::default()
            }),
        );
        record
    }

    #[tokio::test]
    async fn captures_all_four_views_in_order() {
        let mut surface = FakeSurface::default();
        let views = capture_item(&mut surface, &rasterizer(), &image_record()).await.unwrap();

        assert_eq!(views.count(), 4);
        assert_eq!(surface.views, ScreenshotView::ALL.to_vec());
        assert_eq!(surface.decals.len(), 1);
        assert_eq!(
            surface.decals[0].source,
            DecalSource::Url("https://cdn.example.com/logo.png".into())
        );
    }

    #[tokio::test]
    async fn text_layer_becomes_png_decal_in_front_of_image() {
        let mut record = image_record();
        let mut entry = record.front.clone().unwrap();
        entry.text = Some(TextLayer {
            value: "TEAM".into(),
            font: "sans-serif".into(),
            color: "#000000".into(),
        });
        record.set(PlacementZone::Front, Some(entry));

        let bounds = FakeSurface::default().model_bounds();
        let decals = prepare_decals(&record, &bounds, &rasterizer()).await.unwrap();

        assert_eq!(decals.len(), 2);
        assert_eq!(decals[1].kind, LayerKind::Text);
        assert!(matches!(
            &decals[1].source,
            DecalSource::Png(png) if png.starts_with(&PNG_SIGNATURE)
        ));
        assert!(decals[1].transform.position.z > decals[0].transform.position.z);
    }

    #[tokio::test]
    async fn failed_item_does_not_stop_the_rest() {
        let mut surface = FakeSurface {
            fail_view: Some(ScreenshotView::Back),
            fail_once: true,
            ..FakeSurface::default()
        };
        let records = [image_record(), CustomizationRecord::default(), image_record()];

        let results = capture_items(&mut surface, &rasterizer(), records.iter()).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_none());
        assert!(results[1].is_none());
        assert_eq!(results[2].as_ref().map(ViewMap::count), Some(4));
        assert_eq!(surface.current, Some(ScreenshotView::Front));
    }

    #[tokio::test]
    async fn non_png_frame_is_rejected() {
        struct BlankSurface(FakeSurface);
        impl RenderSurface for BlankSurface {
            fn model_bounds(&self) -> ModelBounds {
                self.0.model_bounds()
            }
            fn clear_decals(&mut self) {}
            fn apply_decal(&mut self, _: &Decal) -> Result<(), CaptureError> {
                Ok(())
            }
            fn set_view(&mut self, _: ScreenshotView) -> Result<(), CaptureError> {
                Ok(())
            }
            fn render_png(&mut self) -> Result<Vec<u8>, CaptureError> {
                Ok(Vec::new())
            }
        }

        let mut surface = BlankSurface(FakeSurface::default());
        let result = capture_item(&mut surface, &rasterizer(), &image_record()).await;
        assert!(matches!(result, Err(CaptureError::EmptyFrame(ScreenshotView::Front))));
    }
}
