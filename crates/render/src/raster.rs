//! Text layer rasterization.
//!
//! A [`TextLayer`] becomes a 512x512 transparent PNG with the text centered
//! on both axes in bold. The result is then placed exactly like an uploaded
//! image.

use std::sync::Arc;

use threadmark_core::customization::{ImageLayer, TextLayer};
use threadmark_core::screenshots::encode_png_data_url;
use usvg::fontdb::Database;

use crate::fonts::{FontRegistry, FontWait};

/// Edge length of the square text canvas in pixels.
pub const TEXT_CANVAS_PX: u32 = 512;

/// Upper bound on the font size so short strings stay legible.
const MAX_FONT_SIZE_PX: f64 = 160.0;

/// Average bold glyph advance as a fraction of the font size.
const GLYPH_ADVANCE_RATIO: f64 = 0.6;

/// Horizontal share of the canvas the text may occupy.
const TEXT_WIDTH_FILL: f64 = 0.9;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Invalid SVG: {0}")]
    Svg(String),

    #[error("Could not allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

/// A rasterized text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedText {
    pub png: Vec<u8>,
    /// False when the requested font never became ready and a fallback
    /// family was used.
    pub font_ready: bool,
}

impl RasterizedText {
    /// The bitmap as an image layer, ready for the placement resolver.
    pub fn to_image_layer(&self) -> ImageLayer {
        ImageLayer {
            url: encode_png_data_url(&self.png),
            asset_id: None,
        }
    }
}

/// Renders text layers against a shared [`FontRegistry`].
#[derive(Debug, Clone)]
pub struct TextRasterizer {
    fonts: Arc<FontRegistry>,
    wait: FontWait,
}

impl TextRasterizer {
    pub fn new(fonts: Arc<FontRegistry>) -> Self {
        Self {
            fonts,
            wait: FontWait::default(),
        }
    }

    pub fn with_wait(mut self, wait: FontWait) -> Self {
        self.wait = wait;
        self
    }

    /// Rasterize `text`, waiting for its font first.
    ///
    /// If the font is still missing after the bounded wait the text is drawn
    /// anyway in the fallback family.
    pub async fn rasterize(&self, text: &TextLayer) -> Result<RasterizedText, RasterError> {
        let font_ready = self.fonts.wait_for(&text.font, self.wait).await;
        if !font_ready {
            tracing::warn!(
                font = %text.font,
                waited_ms = self.wait.max_wait.as_millis() as u64,
                "Font not ready, drawing with fallback",
            );
        }

        let svg = text_svg(text);
        let fontdb = self.fonts.snapshot();
        let png = tokio::task::spawn_blocking(move || {
            rasterize_svg(&svg, fontdb, TEXT_CANVAS_PX, TEXT_CANVAS_PX)
        })
        .await
        .map_err(|e| RasterError::Task(e.to_string()))??;

        Ok(RasterizedText { png, font_ready })
    }
}

/// Font size that fits `value` across the canvas.
pub fn fit_font_size(value: &str) -> f64 {
    let chars = value.chars().count().max(1) as f64;
    let fitted = f64::from(TEXT_CANVAS_PX) * TEXT_WIDTH_FILL / (chars * GLYPH_ADVANCE_RATIO);
    fitted.min(MAX_FONT_SIZE_PX)
}

/// SVG source for a centered, bold text layer on a transparent canvas.
pub fn text_svg(text: &TextLayer) -> String {
    let size = TEXT_CANVAS_PX;
    let half = f64::from(size) / 2.0;
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
            r#"<text x="{half}" y="{half}" text-anchor="middle" dominant-baseline="central" "#,
            r#"font-family="{font}, sans-serif" font-weight="bold" font-size="{font_size:.1}" fill="{color}">"#,
            "{value}</text></svg>"
        ),
        size = size,
        half = half,
        font = escape_xml(&text.font),
        font_size = fit_font_size(&text.value),
        color = escape_xml(&text.color),
        value = escape_xml(&text.value),
    )
}

/// Render an SVG document to PNG bytes at `width` x `height`.
pub fn rasterize_svg(
    svg: &str,
    fontdb: Arc<Database>,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, RasterError> {
    let mut options = usvg::Options::default();
    options.fontdb = fontdb;
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| RasterError::Svg(e.to_string()))?;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::Pixmap { width, height })?;
    let tree_size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / tree_size.width(),
        height as f32 / tree_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RasterError::Encode(e.to_string()))
}

pub(crate) fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::GenericImageView;

    use super::*;

    fn layer(value: &str, font: &str) -> TextLayer {
        TextLayer {
            value: value.into(),
            font: font.into(),
            color: "#ff0000".into(),
        }
    }

    #[test]
    fn svg_is_centered_bold_and_escaped() {
        let svg = text_svg(&layer("Tom & <Jerry>", "Inter"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"dominant-baseline="central""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(svg.contains(r#"x="256" y="256""#));
    }

    #[test]
    fn long_text_shrinks_short_text_is_capped() {
        assert_eq!(fit_font_size("A"), MAX_FONT_SIZE_PX);
        assert!(fit_font_size("A much longer slogan for the back") < 30.0);
    }

    #[test]
    fn rasterized_svg_is_transparent_png_of_requested_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"></svg>"#;
        let png = rasterize_svg(svg, Arc::new(Database::new()), 64, 64).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (64, 64));
        assert_eq!(decoded.get_pixel(32, 32).0[3], 0);
    }

    #[test]
    fn malformed_svg_is_an_error() {
        let result = rasterize_svg("<svg", Arc::new(Database::new()), 8, 8);
        assert!(matches!(result, Err(RasterError::Svg(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn draws_anyway_when_font_never_loads() {
        let rasterizer = TextRasterizer::new(Arc::new(FontRegistry::new())).with_wait(FontWait {
            poll_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(100),
        });

        let out = rasterizer.rasterize(&layer("HELLO", "Not A Real Font")).await.unwrap();
        assert!(!out.font_ready);
        let decoded = image::load_from_memory(&out.png).unwrap();
        assert_eq!(decoded.dimensions(), (TEXT_CANVAS_PX, TEXT_CANVAS_PX));
        assert!(out.to_image_layer().url.starts_with("data:image/png;base64,"));
    }
}
