//! Writing documents as single page PDFs.
//!
//! Glyph outlines are written as filled paths, so the PDF doesn't embed the
//! font. The output contains no timestamps or ids and only depends on the
//! document.

use pdf_writer::{Content, Filter, Finish, Pdf, Rect, Ref};
use tiny_skia_path::{Path, PathSegment};

use crate::color::Color;
use crate::document::{Element, VectorDocument};
use crate::error::FontpressResult;

/// Render a document to PDF.
pub fn render_pdf(document: &VectorDocument, compress: bool) -> FontpressResult<Vec<u8>> {
    let mut alloc = Ref::new(1);
    let catalog_ref = alloc.bump();
    let page_tree_ref = alloc.bump();
    let page_ref = alloc.bump();
    let content_ref = alloc.bump();

    let mut pdf = Pdf::new();

    pdf.catalog(catalog_ref).pages(page_tree_ref);
    pdf.pages(page_tree_ref).kids([page_ref]).count(1);

    let mut page = pdf.page(page_ref);
    page.media_box(Rect::new(0.0, 0.0, document.width(), document.height()));
    page.parent(page_tree_ref);
    page.contents(content_ref);
    page.finish();

    let content = content_stream(document);

    if compress {
        pdf.stream(content_ref, &deflate(&content))
            .filter(Filter::FlateDecode);
    } else {
        pdf.stream(content_ref, &content);
    }

    Ok(pdf.finish())
}

fn content_stream(document: &VectorDocument) -> Vec<u8> {
    let mut content = Content::new();

    // Documents have y pointing down, PDF pages have it pointing up.
    content.transform([1.0, 0.0, 0.0, -1.0, 0.0, document.height()]);

    for element in document.elements() {
        match element {
            Element::Rect { fill } => {
                set_fill(&mut content, *fill);
                content.rect(0.0, 0.0, document.width(), document.height());
                content.fill_nonzero();
            }
            Element::Glyph {
                transform,
                path,
                fill,
            } => {
                content.save_state();
                content.transform([
                    transform.sx,
                    transform.ky,
                    transform.kx,
                    transform.sy,
                    transform.tx,
                    transform.ty,
                ]);
                set_fill(&mut content, *fill);
                draw_path(&mut content, path);
                content.fill_nonzero();
                content.restore_state();
            }
        }
    }

    content.finish()
}

fn set_fill(content: &mut Content, color: Color) {
    let [r, g, b] = color.to_normalized();
    content.set_fill_rgb(r, g, b);
}

fn draw_path(content: &mut Content, path: &Path) {
    // Taken from resvg
    fn calc(n1: f32, n2: f32) -> f32 {
        (n1 + n2 * 2.0) / 3.0
    }

    let mut p_prev = None;

    for operation in path.segments() {
        match operation {
            PathSegment::MoveTo(p) => {
                content.move_to(p.x, p.y);
                p_prev = Some(p);
            }
            PathSegment::LineTo(p) => {
                content.line_to(p.x, p.y);
                p_prev = Some(p);
            }
            PathSegment::QuadTo(p1, p2) => {
                // PDF doesn't support quad curves, so they are converted into cubic ones.
                // A path always starts with a move, so there is a previous point.
                let prev = p_prev.unwrap_or(p1);
                content.cubic_to(
                    calc(prev.x, p1.x),
                    calc(prev.y, p1.y),
                    calc(p2.x, p1.x),
                    calc(p2.y, p1.y),
                    p2.x,
                    p2.y,
                );
                p_prev = Some(p2);
            }
            PathSegment::CubicTo(p1, p2, p3) => {
                content.cubic_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
                p_prev = Some(p3);
            }
            PathSegment::Close => {
                content.close_path();
            }
        };
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    const COMPRESSION_LEVEL: u8 = 6;
    miniz_oxide::deflate::compress_to_vec_zlib(data, COMPRESSION_LEVEL)
}
