//! The vector document that is rendered to SVG, PDF and PNG.
//!
//! A [`VectorDocument`] is a fixed-size canvas with y pointing down, holding
//! an optional background rectangle followed by one filled path per glyph.
//! All renderers work off the same document, so what ends up in the PDF
//! is exactly what is shown in the SVG.

use std::fmt::Write;

use tiny_skia_path::{Path, PathSegment, Point, Transform};

use crate::color::{Background, Color};
use crate::configure::Settings;
use crate::error::FontpressResult;
use crate::render::OutputFormat;
use crate::text::TextLayout;

/// The number of decimal places written for coordinates.
const PRECISION: usize = 3;

/// An element of a document, painted in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A rectangle covering the whole canvas.
    Rect {
        /// The fill color.
        fill: Color,
    },
    /// The outline of a glyph.
    Glyph {
        /// The transform from font units to canvas coordinates.
        transform: Transform,
        /// The outline in font units.
        path: Path,
        /// The fill color.
        fill: Color,
    },
}

/// A fixed-size vector document.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    width: f32,
    height: f32,
    elements: Vec<Element>,
}

impl VectorDocument {
    /// The width of the canvas.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// The height of the canvas.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The elements, in painting order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The color of the background rectangle, if there is one.
    pub fn background(&self) -> Option<Color> {
        match self.elements.first() {
            Some(Element::Rect { fill }) => Some(*fill),
            _ => None,
        }
    }

    /// Serialize the document to SVG.
    ///
    /// The output only depends on the document, writing the same document
    /// twice yields the same bytes.
    pub fn to_svg(&self) -> String {
        let width = fmt_number(self.width);
        let height = fmt_number(self.height);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );

        for element in &self.elements {
            match element {
                Element::Rect { fill } => {
                    let _ = write!(
                        svg,
                        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{fill}"/>"#
                    );
                }
                Element::Glyph {
                    transform,
                    path,
                    fill,
                } => {
                    let _ = write!(
                        svg,
                        r#"<g transform="matrix({} {} {} {} {} {})"><path d="{}" fill="{fill}"/></g>"#,
                        fmt_number(transform.sx),
                        fmt_number(transform.ky),
                        fmt_number(transform.kx),
                        fmt_number(transform.sy),
                        fmt_number(transform.tx),
                        fmt_number(transform.ty),
                        path_data(path),
                    );
                }
            }
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Assembles laid out text into documents.
#[derive(Debug, Clone, Copy)]
pub struct VectorDocumentComposer {
    pdf_background: Color,
}

impl VectorDocumentComposer {
    /// Create a new composer. `pdf_background` is used for PDF output when
    /// no background was requested.
    pub fn new(pdf_background: Color) -> Self {
        Self { pdf_background }
    }

    /// Create a new composer from settings.
    pub fn from_settings(settings: &Settings) -> FontpressResult<Self> {
        Ok(Self::new(settings.pdf_background.parse()?))
    }

    /// Build the document for a laid out line of text.
    ///
    /// PDF pages can't be transparent, so a missing background is replaced
    /// with the configured PDF background. For PNG output it stays missing.
    pub fn compose(
        &self,
        layout: &TextLayout,
        background: Background,
        format: OutputFormat,
    ) -> VectorDocument {
        let background = match (background, format) {
            (Background::None, OutputFormat::Pdf) => Some(self.pdf_background),
            (Background::None, OutputFormat::Png) => None,
            (Background::Fill(color), _) => Some(color),
        };

        let mut elements = Vec::with_capacity(layout.glyphs.len() + 1);
        elements.extend(background.map(|fill| Element::Rect { fill }));

        elements.extend(layout.glyphs.iter().filter_map(|glyph| {
            glyph.outline.as_ref().map(|path| Element::Glyph {
                transform: glyph.transform(),
                path: path.clone(),
                fill: glyph.color,
            })
        }));

        VectorDocument {
            width: layout.bbox.width,
            height: layout.bbox.height,
            elements,
        }
    }

    /// Build a document that is filled with a single color.
    pub fn compose_color(&self, width: f32, height: f32, color: Color) -> VectorDocument {
        VectorDocument {
            width: width.max(0.0),
            height: height.max(0.0),
            elements: vec![Element::Rect { fill: color }],
        }
    }
}

fn path_data(path: &Path) -> String {
    let mut d = String::new();

    for segment in path.segments() {
        if !d.is_empty() {
            d.push(' ');
        }

        match segment {
            PathSegment::MoveTo(p) => {
                d.push_str("M ");
                point(&mut d, p);
            }
            PathSegment::LineTo(p) => {
                d.push_str("L ");
                point(&mut d, p);
            }
            PathSegment::QuadTo(p1, p) => {
                d.push_str("Q ");
                point(&mut d, p1);
                d.push(' ');
                point(&mut d, p);
            }
            PathSegment::CubicTo(p1, p2, p) => {
                d.push_str("C ");
                point(&mut d, p1);
                d.push(' ');
                point(&mut d, p2);
                d.push(' ');
                point(&mut d, p);
            }
            PathSegment::Close => d.push('Z'),
        }
    }

    d
}

fn point(d: &mut String, p: Point) {
    let _ = write!(d, "{} {}", fmt_number(p.x), fmt_number(p.y));
}

/// Format a number with a bounded number of decimals and no trailing zeros.
fn fmt_number(v: f32) -> String {
    let s = format!("{v:.PRECISION$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };

    match s {
        "-0" => "0".to_string(),
        s => s.to_string(),
    }
}
