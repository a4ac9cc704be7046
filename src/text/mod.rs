//! Turning text into positioned glyph outlines.

pub mod glyph;
pub mod layout;

pub use glyph::{Glyph, GlyphOutlineExtractor};
pub use layout::{BoundingBox, PositionedGlyph, TextLayout, TextLayoutEngine};
