//! Rendering vector documents to PDF and PNG.

use std::fmt;
use std::str::FromStr;

use log::info;

use crate::configure::Settings;
use crate::document::VectorDocument;
use crate::error::{FontpressError, FontpressResult};

pub mod alpha;
pub mod pdf;
pub mod png;

pub use alpha::apply_alpha_matte;
pub use pdf::render_pdf;
pub use png::render_png;

/// The file type a document is rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// A single page PDF.
    Pdf,
    /// A PNG image.
    Png,
}

impl OutputFormat {
    /// The file extension of the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = FontpressError;

    fn from_str(s: &str) -> FontpressResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "png" => Ok(OutputFormat::Png),
            _ => Err(FontpressError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Settings that should be applied when rendering a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// The resolution of PNG output. 72 renders one pixel per document unit.
    pub dpi: u32,
    /// Whether PDF content streams are compressed.
    pub compress_content_streams: bool,
    /// The largest number of pixels of PNG output.
    pub max_pixels: u64,
}

impl RenderSettings {
    /// Create render settings, using the default resolution of the settings
    /// if none is given.
    pub fn new(settings: &Settings, dpi: Option<u32>) -> Self {
        Self {
            dpi: dpi.unwrap_or(settings.default_dpi),
            compress_content_streams: settings.compress_content_streams,
            max_pixels: settings.max_pixels,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new(&Settings::default(), None)
    }
}

/// Render a document.
pub fn render(
    document: &VectorDocument,
    format: OutputFormat,
    settings: &RenderSettings,
) -> FontpressResult<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Pdf => render_pdf(document, settings.compress_content_streams)?,
        OutputFormat::Png => render_png(document, settings.dpi, settings.max_pixels)?,
    };

    info!(
        "rendered {}x{} document to {} bytes of {format}",
        document.width(),
        document.height(),
        bytes.len()
    );

    Ok(bytes)
}
