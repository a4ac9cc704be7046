//! Tracing outline-based glyphs into paths.

use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::MetadataProvider;
use tiny_skia_path::{Path, PathBuilder};

use crate::font::{Font, GlyphId};

/// The unhinted outline of a glyph, in font units with the y axis pointing up.
///
/// Returns `None` for glyphs without contours, like the space.
pub(crate) fn glyph_path(font: &Font, glyph: GlyphId) -> Option<Path> {
    let outline_glyphs = font.font_ref().outline_glyphs();
    let mut outline_builder = OutlineBuilder::new();

    if let Some(outline_glyph) = outline_glyphs.get(glyph.to_skrifa()) {
        outline_glyph
            .draw(
                DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                &mut outline_builder,
            )
            .ok()?;
    }

    outline_builder.finish()
}

/// A wrapper struct for implementing the `OutlinePen` trait.
pub(crate) struct OutlineBuilder(PathBuilder);

impl OutlineBuilder {
    pub(crate) fn new() -> Self {
        Self(PathBuilder::new())
    }

    pub(crate) fn finish(self) -> Option<Path> {
        self.0.finish()
    }
}

impl OutlinePen for OutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to(cx0, cy0, x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.cubic_to(cx0, cy0, cx1, cy1, x, y);
    }

    fn close(&mut self) {
        self.0.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia_path::PathSegment;

    #[test]
    fn pen_builds_closed_contours() {
        let mut pen = OutlineBuilder::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.quad_to(100.0, 50.0, 50.0, 100.0);
        pen.curve_to(25.0, 100.0, 0.0, 75.0, 0.0, 50.0);
        pen.close();

        let path = pen.finish().unwrap();
        let segments = path.segments().collect::<Vec<_>>();
        assert_eq!(segments.len(), 5);
        assert!(matches!(segments[4], PathSegment::Close));
        assert_eq!(path.bounds().right(), 100.0);
    }

    #[test]
    fn empty_pen_has_no_path() {
        assert!(OutlineBuilder::new().finish().is_none());
    }
}
