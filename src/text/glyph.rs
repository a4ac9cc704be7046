//! Looking up the outline and advance of a character.

use log::warn;
use tiny_skia_path::{Path, PathBuilder};

use crate::font::{GlyphId, GlyphSource, VerticalMetrics};

/// The drawable representation of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// The glyph that was used.
    pub id: GlyphId,
    /// The outline in font units, y pointing up. `None` for blank glyphs.
    pub outline: Option<Path>,
    /// The horizontal advance in font units.
    pub advance_width: f32,
}

/// Extracts glyphs for characters, substituting a fallback glyph for
/// characters the font doesn't cover.
pub struct GlyphOutlineExtractor<'a, S: ?Sized> {
    source: &'a S,
    fallback: GlyphId,
}

impl<'a, S: GlyphSource + ?Sized> GlyphOutlineExtractor<'a, S> {
    /// Create a new extractor.
    pub fn new(source: &'a S, fallback: GlyphId) -> Self {
        Self { source, fallback }
    }

    /// The glyph of a character. Never fails: unmapped characters use the
    /// fallback glyph, which always has an outline.
    pub fn outline(&self, c: char) -> Glyph {
        match self.source.glyph_id(c) {
            Some(id) => Glyph {
                id,
                outline: self.source.outline(id),
                advance_width: self.advance(id),
            },
            None => self.fallback_glyph(),
        }
    }

    fn fallback_glyph(&self) -> Glyph {
        let id = self.fallback;
        let advance_width = self.advance(id);
        let outline = self.source.outline(id).or_else(|| {
            warn!("fallback glyph {} has no outline, drawing a box", id.to_u32());
            tofu(advance_width, &self.source.metrics())
        });

        Glyph {
            id,
            outline,
            advance_width,
        }
    }

    fn advance(&self, id: GlyphId) -> f32 {
        self.source
            .advance_width(id)
            .unwrap_or_else(|| self.source.metrics().units_per_em as f32 * 0.5)
            .max(0.0)
    }
}

/// A hollow box, used when even the fallback glyph is blank.
fn tofu(advance: f32, metrics: &VerticalMetrics) -> Option<Path> {
    let units_per_em = metrics.units_per_em.max(1) as f32;
    let advance = if advance > 0.0 { advance } else { units_per_em * 0.5 };
    let top = if metrics.ascender > 0.0 {
        metrics.ascender * 0.75
    } else {
        units_per_em * 0.7
    };
    let (left, right) = (advance * 0.1, advance * 0.9);
    let stroke = units_per_em * 0.05;

    let mut builder = PathBuilder::new();
    builder.move_to(left, 0.0);
    builder.line_to(right, 0.0);
    builder.line_to(right, top);
    builder.line_to(left, top);
    builder.close();

    if right - left > 2.0 * stroke && top > 2.0 * stroke {
        // Opposite direction, so that the inside stays empty.
        builder.move_to(left + stroke, stroke);
        builder.line_to(left + stroke, top - stroke);
        builder.line_to(right - stroke, top - stroke);
        builder.line_to(right - stroke, stroke);
        builder.close();
    }

    builder.finish()
}
