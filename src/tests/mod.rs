use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use flate2::Crc;
use once_cell::sync::Lazy;
use tiny_skia_path::{Path, PathBuilder, Rect};

use crate::error::{FontpressError, FontpressResult};
use crate::font::{Fetch, Fetched, Font, GlyphId, GlyphSource, VerticalMetrics};

static FONT_PATH: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));

macro_rules! lazy_font {
    ($name:ident, $path:expr) => {
        pub static $name: Lazy<Arc<Vec<u8>>> =
            Lazy::new(|| Arc::new(std::fs::read($path).unwrap()));
    };
}

#[rustfmt::skip]
lazy_font!(DEJAVU_SANS_MONO, FONT_PATH.join("DejaVuSansMono.ttf"));

pub fn dejavu_sans_mono() -> Font {
    Font::new(Arc::clone(&*DEJAVU_SANS_MONO).into()).unwrap()
}

pub fn rect_to_path(x1: f32, y1: f32, x2: f32, y2: f32) -> Path {
    let mut builder = PathBuilder::new();
    builder.push_rect(Rect::from_ltrb(x1, y1, x2, y2).unwrap());
    builder.finish().unwrap()
}

/// A glyph source with a handful of box-shaped glyphs.
///
/// | glyph | char | advance | outline           |
/// |-------|------|---------|-------------------|
/// | 0     |      | 500     | (50, 0, 450, 700) |
/// | 1     | `H`  | 700     | (50, 0, 650, 700) |
/// | 2     | `i`  | 300     | (50, 0, 230, 500) |
/// | 3     | ` `  | 250     | none              |
pub struct TestFont {
    cmap: HashMap<char, GlyphId>,
    glyphs: Vec<(f32, Option<Path>)>,
    metrics: VerticalMetrics,
}

impl TestFont {
    pub fn hi() -> Self {
        Self {
            cmap: HashMap::from([
                ('H', GlyphId::new(1)),
                ('i', GlyphId::new(2)),
                (' ', GlyphId::new(3)),
            ]),
            glyphs: vec![
                (500.0, Some(rect_to_path(50.0, 0.0, 450.0, 700.0))),
                (700.0, Some(rect_to_path(50.0, 0.0, 650.0, 700.0))),
                (300.0, Some(rect_to_path(50.0, 0.0, 230.0, 500.0))),
                (250.0, None),
            ],
            metrics: VerticalMetrics {
                units_per_em: 1000,
                ascender: 800.0,
                descender: -200.0,
                line_gap: 0.0,
            },
        }
    }

    pub fn without_notdef_outline(mut self) -> Self {
        self.glyphs[0].1 = None;
        self
    }
}

impl GlyphSource for TestFont {
    fn glyph_id(&self, c: char) -> Option<GlyphId> {
        self.cmap.get(&c).copied()
    }

    fn outline(&self, glyph: GlyphId) -> Option<Path> {
        self.glyphs.get(glyph.to_u32() as usize)?.1.clone()
    }

    fn advance_width(&self, glyph: GlyphId) -> Option<f32> {
        self.glyphs.get(glyph.to_u32() as usize).map(|g| g.0)
    }

    fn metrics(&self) -> VerticalMetrics {
        self.metrics
    }
}

/// A fetcher that answers every request the same way and remembers the
/// requested URLs. Clones share the list of requests.
#[derive(Clone)]
pub struct StubFetcher {
    response: Result<Vec<u8>, u16>,
    requested: Rc<RefCell<Vec<String>>>,
}

impl StubFetcher {
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self {
            response: Ok(bytes),
            requested: Rc::default(),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            requested: Rc::default(),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Fetch for StubFetcher {
    fn fetch(&self, url: &str) -> FontpressResult<Fetched> {
        self.requested.borrow_mut().push(url.to_string());

        match &self.response {
            Ok(bytes) => Ok(Fetched {
                bytes: bytes.clone(),
                elapsed: Duration::from_millis(12),
            }),
            Err(status) => Err(FontpressError::DownloadFailed(Some(*status))),
        }
    }
}

struct ZipFile {
    name: String,
    method: u16,
    crc32: u32,
    uncompressed_size: u32,
    raw: Vec<u8>,
}

/// Builds ZIP archives in memory.
#[derive(Default)]
pub struct ZipBuilder {
    files: Vec<ZipFile>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, name: &str) -> Self {
        self.push(name, 0, b"", Vec::new());
        self
    }

    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.push(name, 0, data, data.to_vec());
        self
    }

    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let raw = miniz_oxide::deflate::compress_to_vec(data, 6);
        self.push(name, 8, data, raw);
        self
    }

    fn push(&mut self, name: &str, method: u16, data: &[u8], raw: Vec<u8>) {
        let mut crc = Crc::new();
        crc.update(data);

        self.files.push(ZipFile {
            name: name.to_string(),
            method,
            crc32: crc.sum(),
            uncompressed_size: data.len() as u32,
            raw,
        });
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::with_capacity(self.files.len());

        for file in &self.files {
            offsets.push(out.len() as u32);

            out.extend(0x04034b50u32.to_le_bytes());
            out.extend(20u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(file.method.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(file.crc32.to_le_bytes());
            out.extend((file.raw.len() as u32).to_le_bytes());
            out.extend(file.uncompressed_size.to_le_bytes());
            out.extend((file.name.len() as u16).to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(file.name.as_bytes());
            out.extend(&file.raw);
        }

        let central_directory_offset = out.len() as u32;

        for (file, offset) in self.files.iter().zip(offsets) {
            out.extend(0x02014b50u32.to_le_bytes());
            out.extend(20u16.to_le_bytes());
            out.extend(20u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(file.method.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(file.crc32.to_le_bytes());
            out.extend((file.raw.len() as u32).to_le_bytes());
            out.extend(file.uncompressed_size.to_le_bytes());
            out.extend((file.name.len() as u16).to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(0u16.to_le_bytes());
            out.extend(0u32.to_le_bytes());
            out.extend(offset.to_le_bytes());
            out.extend(file.name.as_bytes());
        }

        let central_directory_size = out.len() as u32 - central_directory_offset;
        let count = self.files.len() as u16;

        out.extend(0x06054b50u32.to_le_bytes());
        out.extend(0u16.to_le_bytes());
        out.extend(0u16.to_le_bytes());
        out.extend(count.to_le_bytes());
        out.extend(count.to_le_bytes());
        out.extend(central_directory_size.to_le_bytes());
        out.extend(central_directory_offset.to_le_bytes());
        out.extend(0u16.to_le_bytes());

        out
    }
}
