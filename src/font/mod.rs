//! Resolving, loading and reading fonts.
//!
//! Getting from a font name or URL to a usable [`Font`] happens in a few steps:
//! the [`FontSource`] is turned into a URL, the payload is downloaded with a
//! [`Fetch`] implementation, archives are opened with [`ZipArchive`] and the
//! right file is chosen with [`pick`]. The [`FontResolver`] ties all of this
//! together.

pub(crate) mod outline;

pub mod archive;
pub mod fetch;
pub mod picker;
pub mod resolve;
pub mod source;

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use skrifa::instance::{LocationRef, Size};
use skrifa::metrics::GlyphMetrics;
use skrifa::raw::{ReadError, TableProvider};
use skrifa::{FontRef, MetadataProvider};
use tiny_skia_path::Path;
use yoke::{Yoke, Yokeable};

pub use archive::{is_archive, Archive, ArchiveEntry, ZipArchive};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetch, Fetched};
pub use picker::{pick, Pick, WeightQuery};
pub use resolve::{FontResolver, LoadedFont, RawFontPayload, ResolvedFont};
pub use source::FontSource;

use crate::Data;

/// The index of a glyph in a font.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GlyphId(u32);

impl GlyphId {
    /// The `.notdef` glyph.
    pub const NOTDEF: GlyphId = GlyphId(0);

    /// Create a new glyph ID.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the glyph ID as a u32.
    pub fn to_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn to_skrifa(self) -> skrifa::GlyphId {
        skrifa::GlyphId::new(self.0)
    }
}

/// Vertical metrics of a font, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMetrics {
    /// The size of the em square.
    pub units_per_em: u16,
    /// The distance from the baseline to the top of the line.
    pub ascender: f32,
    /// The distance from the baseline to the bottom of the line. Usually negative.
    pub descender: f32,
    /// Additional space between lines.
    pub line_gap: f32,
}

impl VerticalMetrics {
    /// The factor that converts font units into output units for a text size.
    ///
    /// `reference_units_per_em` is used for fonts that report an em size of zero.
    pub fn scale(&self, size: f32, reference_units_per_em: u16) -> f32 {
        let units_per_em = if self.units_per_em == 0 {
            reference_units_per_em
        } else {
            self.units_per_em
        };

        size / units_per_em.max(1) as f32
    }

    /// The height of one line, in font units.
    pub fn line_height(&self) -> f32 {
        self.ascender - self.descender + self.line_gap
    }
}

/// Read access to the glyphs of a font.
///
/// Layout only talks to fonts through this trait. Implementations must be
/// shareable between threads, outlines may be extracted in parallel.
pub trait GlyphSource: Sync {
    /// Map a character to a glyph, if the font contains one for it.
    fn glyph_id(&self, c: char) -> Option<GlyphId>;
    /// The outline of a glyph in font units, or `None` if the glyph is blank.
    fn outline(&self, glyph: GlyphId) -> Option<Path>;
    /// The horizontal advance of a glyph in font units.
    fn advance_width(&self, glyph: GlyphId) -> Option<f32>;
    /// The vertical metrics of the font.
    fn metrics(&self) -> VerticalMetrics;
}

/// An OpenType font, either TrueType- or CFF-flavored. For collections, the
/// first font is used.
///
/// Cloning this type is cheap.
#[derive(Clone)]
pub struct Font(Arc<Repr>);

struct Repr {
    metrics: VerticalMetrics,
    font_ref_yoke: Yoke<FontRefYoke<'static>, Arc<dyn AsRef<[u8]> + Send + Sync>>,
}

impl Font {
    /// Create a new font from some data.
    ///
    /// Returns `None` if the data isn't a font that can be read.
    pub fn new(data: Data) -> Option<Self> {
        let metrics = read_metrics(&FontRef::from_index(data.as_ref(), 0).ok()?)?;

        let font_ref_yoke =
            Yoke::<FontRefYoke<'static>, Arc<dyn AsRef<[u8]> + Send + Sync>>::try_attach_to_cart(
                data.0.clone(),
                |data| {
                    let font_ref = FontRef::from_index(data.as_ref(), 0)?;
                    Ok::<_, ReadError>(FontRefYoke {
                        glyph_metrics: font_ref
                            .glyph_metrics(Size::unscaled(), LocationRef::default()),
                        font_ref,
                    })
                },
            )
            .ok()?;

        Some(Font(Arc::new(Repr {
            metrics,
            font_ref_yoke,
        })))
    }

    pub(crate) fn font_ref(&self) -> &FontRef {
        &self.0.font_ref_yoke.get().font_ref
    }

    pub(crate) fn glyph_metrics(&self) -> &GlyphMetrics {
        &self.0.font_ref_yoke.get().glyph_metrics
    }
}

impl GlyphSource for Font {
    fn glyph_id(&self, c: char) -> Option<GlyphId> {
        self.font_ref()
            .charmap()
            .map(c)
            .map(|g| GlyphId::new(g.to_u32()))
    }

    fn outline(&self, glyph: GlyphId) -> Option<Path> {
        outline::glyph_path(self, glyph)
    }

    #[inline]
    fn advance_width(&self, glyph: GlyphId) -> Option<f32> {
        self.glyph_metrics().advance_width(glyph.to_skrifa())
    }

    fn metrics(&self) -> VerticalMetrics {
        self.0.metrics
    }
}

impl Debug for Font {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Font {{..}}")
    }
}

/// Read the em size from `head` and the line metrics from `hhea`, which is what
/// browsers and most SVG tooling use. Fonts without `hhea` fall back to
/// skrifa's own choice of metrics.
fn read_metrics(font_ref: &FontRef) -> Option<VerticalMetrics> {
    let units_per_em = font_ref.head().ok()?.units_per_em();

    let metrics = match font_ref.hhea() {
        Ok(hhea) => VerticalMetrics {
            units_per_em,
            ascender: hhea.ascender().to_i16() as f32,
            descender: hhea.descender().to_i16() as f32,
            line_gap: hhea.line_gap().to_i16() as f32,
        },
        Err(_) => {
            let metrics = font_ref.metrics(Size::unscaled(), LocationRef::default());
            VerticalMetrics {
                units_per_em,
                ascender: metrics.ascent,
                descender: metrics.descent,
                line_gap: metrics.leading,
            }
        }
    };

    Some(metrics)
}

/// A yoke so that we can attach a `FontRef` object to the corresponding `Font`,
/// without running into lifetime issues.
#[derive(Yokeable, Clone)]
struct FontRefYoke<'a> {
    pub font_ref: FontRef<'a>,
    pub glyph_metrics: GlyphMetrics<'a>,
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::tests::dejavu_sans_mono;

    #[test]
    fn metrics_come_from_head_and_hhea() {
        assert_eq!(
            dejavu_sans_mono().metrics(),
            VerticalMetrics {
                units_per_em: 2048,
                ascender: 1901.0,
                descender: -483.0,
                line_gap: 0.0,
            }
        );
    }

    #[test]
    fn mapped_glyph_has_outline_and_advance() {
        let font = dejavu_sans_mono();
        let glyph = font.glyph_id('A').unwrap();

        assert_eq!(glyph, GlyphId::new(36));
        assert_eq!(font.advance_width(glyph), Some(1233.0));

        let bounds = font.outline(glyph).unwrap().bounds();
        assert_approx_eq!(f32, bounds.left(), 37.0, epsilon = 0.5);
        assert_approx_eq!(f32, bounds.top(), 0.0, epsilon = 0.5);
        assert_approx_eq!(f32, bounds.right(), 1196.0, epsilon = 0.5);
        assert_approx_eq!(f32, bounds.bottom(), 1493.0, epsilon = 0.5);
    }

    #[test]
    fn space_is_blank() {
        let font = dejavu_sans_mono();
        let glyph = font.glyph_id(' ').unwrap();

        assert_eq!(glyph, GlyphId::new(3));
        assert!(font.outline(glyph).is_none());
        assert_eq!(font.advance_width(glyph), Some(1233.0));
    }

    #[test]
    fn unmapped_characters_have_no_glyph() {
        let font = dejavu_sans_mono();
        assert_eq!(font.glyph_id('あ'), None);
        assert_eq!(font.glyph_id('\u{E000}'), None);
    }

    #[test]
    fn clones_share_the_font() {
        let font = dejavu_sans_mono();
        let clone = font.clone();
        assert_eq!(clone.glyph_id('H'), font.glyph_id('H'));
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(Font::new(vec![0u8; 64].into()).is_none());
        assert!(Font::new(b"PK\x03\x04not a font".to_vec().into()).is_none());
    }

    #[test]
    fn scale_reads_the_em_size() {
        let metrics = VerticalMetrics {
            units_per_em: 1000,
            ascender: 800.0,
            descender: -200.0,
            line_gap: 0.0,
        };
        assert_eq!(metrics.scale(32.0, 750), 0.032);
        assert_eq!(metrics.line_height(), 1000.0);
    }

    #[test]
    fn scale_falls_back_to_reference_grid() {
        let metrics = VerticalMetrics {
            units_per_em: 0,
            ascender: 600.0,
            descender: -150.0,
            line_gap: 0.0,
        };
        assert_eq!(metrics.scale(30.0, 750), 0.04);
    }
}
