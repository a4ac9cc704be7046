//! Rasterizing documents with resvg.

use log::debug;
use tiny_skia_path::Transform;

use crate::document::VectorDocument;
use crate::error::{FontpressError, FontpressResult};

/// The resolution at which one document unit is one pixel.
const BASE_DPI: f32 = 72.0;

/// Render a document to a PNG image at the given resolution.
///
/// Areas without a background stay transparent. Images with more than
/// `max_pixels` pixels are rejected before anything is allocated.
pub fn render_png(
    document: &VectorDocument,
    dpi: u32,
    max_pixels: u64,
) -> FontpressResult<Vec<u8>> {
    let raster_scale = dpi.max(1) as f32 / BASE_DPI;
    let width = pixel_size(document.width(), raster_scale);
    let height = pixel_size(document.height(), raster_scale);

    if width as u64 * height as u64 > max_pixels {
        return Err(FontpressError::ImageTooLarge { width, height });
    }

    let svg = document.to_svg();
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
        .map_err(|e| FontpressError::Rasterization(format!("failed to parse document: {e}")))?;

    debug!("rasterizing document to {width}x{height} pixels at {dpi} dpi");

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        FontpressError::Rasterization(format!("cannot allocate a {width}x{height} pixmap"))
    })?;

    resvg::render(
        &tree,
        Transform::from_scale(raster_scale, raster_scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| FontpressError::Rasterization(format!("failed to encode png: {e}")))
}

fn pixel_size(size: f32, raster_scale: f32) -> u32 {
    (size * raster_scale).ceil().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;
    use crate::color::{Background, Color};
    use crate::configure::Settings;
    use crate::document::VectorDocumentComposer;
    use crate::render::OutputFormat;
    use crate::tests::TestFont;
    use crate::text::TextLayoutEngine;

    const MAX_PIXELS: u64 = 1_000_000;

    fn composer() -> VectorDocumentComposer {
        VectorDocumentComposer::new(Color::white())
    }

    #[test]
    fn color_document_is_filled() {
        let doc = composer().compose_color(10.0, 4.0, Color::new(255, 0, 0));
        let png = render_png(&doc, 72, MAX_PIXELS).unwrap();
        let image = image::load_from_memory(&png).unwrap();

        assert_eq!(image.dimensions(), (10, 4));
        assert_eq!(image.get_pixel(5, 2).0, [255, 0, 0, 255]);
    }

    #[test]
    fn dpi_scales_the_image() {
        let doc = composer().compose_color(10.0, 4.0, Color::black());
        let png = render_png(&doc, 144, MAX_PIXELS).unwrap();
        let image = image::load_from_memory(&png).unwrap();

        assert_eq!(image.dimensions(), (20, 8));
    }

    #[test]
    fn glyphs_are_drawn_on_transparency() {
        let layout = TextLayoutEngine::new(32.0, &Settings::default()).layout(
            "H",
            &TestFont::hi(),
            Color::black(),
        );
        let doc = composer().compose(&layout, Background::None, OutputFormat::Png);
        let png = render_png(&doc, 72, MAX_PIXELS).unwrap();
        let image = image::load_from_memory(&png).unwrap();

        assert_eq!(image.dimensions(), (28, 47));
        // Inside of the H box: x in 1.6..20.8, y in 9.6..32.
        assert_eq!(image.get_pixel(10, 20).0, [0, 0, 0, 255]);
        // Below the baseline.
        assert_eq!(image.get_pixel(10, 40).0[3], 0);
    }

    #[test]
    fn oversized_images_are_rejected() {
        let doc = composer().compose_color(100_000.0, 100_000.0, Color::black());
        assert_eq!(
            render_png(&doc, 72, MAX_PIXELS),
            Err(FontpressError::ImageTooLarge {
                width: 100_000,
                height: 100_000
            })
        );
    }

    #[test]
    fn dpi_counts_towards_the_limit() {
        let doc = composer().compose_color(100.0, 100.0, Color::black());
        assert!(render_png(&doc, 72, MAX_PIXELS).is_ok());
        assert!(matches!(
            render_png(&doc, 60_000, MAX_PIXELS),
            Err(FontpressError::ImageTooLarge { .. })
        ));
    }
}
