//! Placing glyphs on a single line.
//!
//! There is no shaping: glyphs are put next to each other from left to right,
//! each one moving the cursor by its advance width. The position of a glyph
//! therefore depends on all glyphs before it. Outlines may be extracted in
//! parallel (with the `rayon` feature), but positions are always accumulated
//! in one sequential pass.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tiny_skia_path::{Path, Transform};

use crate::color::Color;
use crate::configure::Settings;
use crate::font::{GlyphId, GlyphSource};
use crate::text::glyph::{Glyph, GlyphOutlineExtractor};

/// The size of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The width, in output units.
    pub width: f32,
    /// The height, in output units.
    pub height: f32,
}

/// A glyph with its place on the line.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGlyph {
    /// The glyph that is drawn.
    pub id: GlyphId,
    /// The cursor position before the glyph, in output units.
    pub x: f32,
    /// The outline in font units, `None` for blank glyphs.
    pub outline: Option<Path>,
    /// The fill color.
    pub color: Color,
    /// The horizontal translation applied to the outline, `x` rounded.
    pub offset_x: f32,
    /// The vertical translation applied to the outline, the baseline.
    pub offset_y: f32,
    /// The factor from font units to output units.
    pub scale: f32,
}

impl PositionedGlyph {
    /// The transform from font units to document coordinates: translate to
    /// the glyph origin, flip the y axis and scale.
    pub fn transform(&self) -> Transform {
        Transform::from_row(
            self.scale,
            0.0,
            0.0,
            -self.scale,
            self.offset_x,
            self.offset_y,
        )
    }
}

/// A laid out line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// All glyphs, in text order.
    pub glyphs: Vec<PositionedGlyph>,
    /// The size of the document that holds the line.
    pub bbox: BoundingBox,
    /// The factor from font units to output units.
    pub scale: f32,
    /// The height of the line in output units.
    pub line_height: f32,
}

/// Lays out text in one font and size.
#[derive(Debug, Clone, Copy)]
pub struct TextLayoutEngine {
    size: f32,
    width_margin: f32,
    height_margin: f32,
    fallback: GlyphId,
    reference_units_per_em: u16,
}

impl TextLayoutEngine {
    /// Create a new engine for a text size, with the remaining parameters
    /// taken from the settings.
    pub fn new(size: f32, settings: &Settings) -> Self {
        Self {
            size,
            width_margin: settings.width_margin,
            height_margin: settings.height_margin,
            fallback: GlyphId::new(settings.fallback_glyph),
            reference_units_per_em: settings.reference_units_per_em,
        }
    }

    /// Lay out a piece of text.
    pub fn layout<S: GlyphSource + ?Sized>(&self, text: &str, source: &S, color: Color) -> TextLayout {
        let metrics = source.metrics();
        let scale = metrics.scale(self.size, self.reference_units_per_em);
        let line_height = (metrics.line_height() * scale).round();

        let extractor = GlyphOutlineExtractor::new(source, self.fallback);
        let glyphs = extract_glyphs(&extractor, text);

        let mut x = 0.0f32;
        let mut positioned = Vec::with_capacity(glyphs.len());

        for glyph in glyphs {
            positioned.push(PositionedGlyph {
                id: glyph.id,
                x,
                outline: glyph.outline,
                color,
                offset_x: x.round(),
                offset_y: line_height,
                scale,
            });
            x += glyph.advance_width * scale;
        }

        TextLayout {
            glyphs: positioned,
            bbox: BoundingBox {
                width: x + self.width_margin,
                height: line_height + self.height_margin,
            },
            scale,
            line_height,
        }
    }
}

#[cfg(not(feature = "rayon"))]
fn extract_glyphs<S: GlyphSource + ?Sized>(
    extractor: &GlyphOutlineExtractor<'_, S>,
    text: &str,
) -> Vec<Glyph> {
    text.chars().map(|c| extractor.outline(c)).collect()
}

#[cfg(feature = "rayon")]
fn extract_glyphs<S: GlyphSource + ?Sized>(
    extractor: &GlyphOutlineExtractor<'_, S>,
    text: &str,
) -> Vec<Glyph> {
    let chars = text.chars().collect::<Vec<_>>();
    chars.par_iter().map(|&c| extractor.outline(c)).collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::tests::{dejavu_sans_mono, TestFont};

    fn engine() -> TextLayoutEngine {
        TextLayoutEngine::new(32.0, &Settings::default())
    }

    #[test]
    fn hi_is_laid_out_left_to_right() {
        let font = TestFont::hi();
        let layout = engine().layout("Hi", &font, Color::black());

        assert_approx_eq!(f32, layout.scale, 0.032);
        assert_eq!(layout.line_height, 32.0);
        assert_eq!(layout.glyphs.len(), 2);
        assert_eq!(layout.glyphs[0].x, 0.0);
        assert_approx_eq!(f32, layout.glyphs[1].x, 22.4, epsilon = 1e-4);
        assert_eq!(layout.glyphs[1].offset_x, 22.0);
        assert_approx_eq!(f32, layout.bbox.width, 32.0 + 5.0, epsilon = 1e-4);
        assert_eq!(layout.bbox.height, 32.0 + 15.0);
    }

    #[test]
    fn positions_never_decrease() {
        let font = TestFont::hi();
        let text = "Hi iH? H i";
        let layout = engine().layout(text, &font, Color::black());

        assert_eq!(layout.glyphs.len(), text.chars().count());
        assert!(layout.glyphs.windows(2).all(|w| w[0].x <= w[1].x));

        let advances = text
            .chars()
            .map(|c| match c {
                'H' => 700.0,
                'i' => 300.0,
                ' ' => 250.0,
                _ => 500.0,
            })
            .sum::<f32>();
        assert_approx_eq!(
            f32,
            layout.bbox.width,
            advances * layout.scale + 5.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn empty_text_only_has_margins() {
        let font = TestFont::hi();
        let layout = engine().layout("", &font, Color::black());

        assert!(layout.glyphs.is_empty());
        assert_eq!(layout.bbox.width, 5.0);
        assert_eq!(layout.bbox.height, 47.0);
    }

    #[test]
    fn transform_flips_and_scales() {
        let font = TestFont::hi();
        let layout = engine().layout("iH", &font, Color::black());
        let h = &layout.glyphs[1];

        let mut point = [tiny_skia_path::Point::from_xy(700.0, 800.0)];
        h.transform().map_points(&mut point);

        assert_approx_eq!(f32, point[0].x, 10.0 + 22.4, epsilon = 1e-3);
        assert_approx_eq!(f32, point[0].y, 32.0 - 25.6, epsilon = 1e-3);
    }

    #[test]
    fn colors_are_attached() {
        let font = TestFont::hi();
        let red = Color::new(255, 0, 0);
        let layout = engine().layout("H", &font, red);
        assert_eq!(layout.glyphs[0].color, red);
    }

    #[test]
    fn real_font_is_laid_out() {
        let font = dejavu_sans_mono();
        let layout = engine().layout("Hi", &font, Color::black());

        assert_eq!(layout.scale, 32.0 / 2048.0);
        // (1901 + 483) / 64 = 37.25
        assert_eq!(layout.line_height, 37.0);
        assert_eq!(layout.glyphs[0].id, GlyphId::new(43));
        assert_eq!(layout.glyphs[1].id, GlyphId::new(76));
        assert_eq!(layout.glyphs[1].x, 1233.0 / 64.0);
        assert_eq!(layout.glyphs[1].offset_x, 19.0);
        assert!(layout.glyphs.iter().all(|g| g.outline.is_some()));
        assert_eq!(layout.bbox.width, 2.0 * 1233.0 / 64.0 + 5.0);
        assert_eq!(layout.bbox.height, 37.0 + 15.0);
    }
}
