//! Error handling.
//!
//! Resolving a font out of an arbitrary download can go wrong in a number of
//! expected ways (a bad URL, a failed download, an archive without fonts, ...).
//! Those are user-correctable and are reported with a stable identifier, so
//! that callers can handle them programmatically. Rendering failures are
//! unexpected and are reported as internal errors.

use serde_json::{json, Value};
use thiserror::Error;

/// A wrapper type for fontpress errors.
pub type FontpressResult<T> = Result<T, FontpressError>;

/// An error in fontpress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontpressError {
    /// The font source is neither an absolute URL nor a usable family name.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The download returned a non-success status, or didn't complete at all.
    #[error("download failed{}", .0.map(|s| format!(" with status {s}")).unwrap_or_default())]
    DownloadFailed(Option<u16>),
    /// No font file could be found in the downloaded payload.
    #[error("font is not found")]
    FontNotFound,
    /// A weight was requested, but no candidate font file matches it.
    #[error("weight `{0}` is not found")]
    WeightNotFound(String),
    /// More than one equally ranked candidate remains and the ambiguity
    /// policy asks for the caller to choose.
    #[error("ambiguous font selection between {} candidates", .0.len())]
    AmbiguousSelection(Vec<String>),
    /// A color could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),
    /// The requested output file type is not supported.
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    /// The requested raster image has more pixels than allowed.
    #[error("a {width}x{height} image exceeds the pixel limit")]
    ImageTooLarge {
        /// The width in pixels.
        width: u32,
        /// The height in pixels.
        height: u32,
    },
    /// Rendering the vector document to PDF or PNG failed.
    #[error("rasterization failed: {0}")]
    Rasterization(String),
}

impl FontpressError {
    /// The stable identifier of the error, as exposed to API clients.
    pub fn id(&self) -> &'static str {
        match self {
            FontpressError::InvalidUrl(_) => "INVALID_URL",
            FontpressError::DownloadFailed(_) => "DOWNLOAD_FAILED",
            FontpressError::FontNotFound => "FONT_NOT_FOUND",
            FontpressError::WeightNotFound(_) => "WEIGHT_NOT_FOUND",
            FontpressError::AmbiguousSelection(_) => "AMBIGUOUS_SELECTION",
            FontpressError::InvalidColor(_) => "INVALID_COLOR",
            FontpressError::UnsupportedFormat(_) => "INVALID_FILETYPE",
            FontpressError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            FontpressError::Rasterization(_) => "RASTERIZATION_FAILED",
        }
    }

    /// The HTTP status code the error maps to.
    pub fn status(&self) -> u16 {
        match self {
            FontpressError::Rasterization(_) => 500,
            _ => 400,
        }
    }

    /// Whether the error is an expected, user-correctable condition.
    pub fn is_user_error(&self) -> bool {
        self.status() < 500
    }
}

/// The longest message that is exposed for internal errors in non-verbose mode.
const MAX_INTERNAL_MESSAGE_LEN: usize = 120;

/// Turns errors into `{msg, id}` response bodies.
///
/// The amount of detail exposed for internal errors is fixed when the
/// formatter is constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorFormatter {
    verbose: bool,
}

impl ErrorFormatter {
    /// Create a new formatter.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// The message shown to the client.
    pub fn message(&self, error: &FontpressError) -> String {
        match error {
            FontpressError::InvalidUrl(_) => "Invalid url.".to_string(),
            FontpressError::DownloadFailed(_) => "Download failed.".to_string(),
            FontpressError::FontNotFound => "Font is not found.".to_string(),
            FontpressError::WeightNotFound(_) => "Weight is not found.".to_string(),
            FontpressError::AmbiguousSelection(_) => {
                "More than one font matches, please specify a weight.".to_string()
            }
            FontpressError::InvalidColor(_) => "Please specify a valid color.".to_string(),
            FontpressError::UnsupportedFormat(_) => "Please specify pdf or png.".to_string(),
            FontpressError::ImageTooLarge { .. } => {
                "The requested image is too large, lower its size or dpi.".to_string()
            }
            FontpressError::Rasterization(msg) if self.verbose => msg.clone(),
            FontpressError::Rasterization(msg) => sanitize(msg),
        }
    }

    /// The full JSON body for an error.
    pub fn body(&self, error: &FontpressError) -> Value {
        let mut body = json!({
            "msg": self.message(error),
            "id": error.id(),
        });

        match error {
            FontpressError::DownloadFailed(Some(status)) => {
                body["returned_status_code"] = json!(status);
            }
            FontpressError::AmbiguousSelection(candidates) => {
                body["weight_list"] = json!(candidates);
            }
            _ => {}
        }

        body
    }
}

/// Keep the first line of a message and cut it to a bounded length.
fn sanitize(msg: &str) -> String {
    let line = msg.lines().next().unwrap_or_default().trim();

    match line.char_indices().nth(MAX_INTERNAL_MESSAGE_LEN) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}
