//! Configuring font resolution, layout and rendering.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorFormatter;

/// An error while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid TOML, or has values of the wrong type.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to do when more than one equally ranked font file remains after
/// filtering an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Use the first candidate, in archive order.
    #[default]
    PickFirst,
    /// Fail with [`FontpressError::AmbiguousSelection`].
    ///
    /// [`FontpressError::AmbiguousSelection`]: crate::error::FontpressError::AmbiguousSelection
    Reject,
}

/// Limits for downloading and unpacking fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// The timeout of a whole download, in seconds.
    pub timeout_secs: u64,
    /// The maximum size of a downloaded payload, in bytes.
    pub max_download_bytes: u64,
    /// The maximum decompressed size of a single archive entry, in bytes.
    pub max_entry_bytes: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_download_bytes: 32 * 1024 * 1024,
            max_entry_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Settings that should be applied when creating a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The requested text size, in output units.
    pub font_size: f32,
    /// Extra horizontal space added after the last glyph.
    pub width_margin: f32,
    /// Extra vertical space added below the line.
    pub height_margin: f32,
    /// The glyph used for characters the font doesn't map.
    ///
    /// Defaults to `.notdef`.
    pub fallback_glyph: u32,
    /// The units per em assumed for fonts that don't report a usable value.
    pub reference_units_per_em: u16,
    /// How to deal with ambiguous archive contents.
    pub ambiguity: AmbiguityPolicy,
    /// The background used for PDF output when no background was requested.
    pub pdf_background: String,
    /// Pixels whose color channels are all at least this value become
    /// transparent in PNG output without a background.
    pub alpha_threshold: u8,
    /// The resolution used for PNG output when none is requested.
    pub default_dpi: u32,
    /// The largest number of pixels a PNG may have.
    pub max_pixels: u64,
    /// Whether content streams in PDF output should be compressed.
    pub compress_content_streams: bool,
    /// Whether internal error messages are exposed in full.
    pub verbose_errors: bool,
    /// The URL used to look up a font family by name. `{family}` is replaced
    /// by the family name.
    pub family_url_template: String,
    /// Download and decompression limits.
    pub fetch: FetchSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            width_margin: 5.0,
            height_margin: 15.0,
            fallback_glyph: 0,
            reference_units_per_em: 750,
            ambiguity: AmbiguityPolicy::default(),
            pdf_background: "white".to_string(),
            alpha_threshold: 240,
            default_dpi: 72,
            max_pixels: 40_000_000,
            compress_content_streams: true,
            verbose_errors: false,
            family_url_template: "https://fonts.google.com/download?family={family}".to_string(),
            fetch: FetchSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string. Missing keys use their defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml(&text)?)
    }

    /// The error formatter matching these settings.
    pub fn error_formatter(&self) -> ErrorFormatter {
        ErrorFormatter::new(self.verbose_errors)
    }
}
