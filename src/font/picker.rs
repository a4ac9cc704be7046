//! Choosing a font file among the entries of an archive.
//!
//! Font downloads usually ship one file per weight, sometimes next to a
//! `static/` directory with the same fonts again, or specimens and licenses
//! in subdirectories. Candidates are narrowed down in a fixed order:
//!
//! 1. only `.ttf` and `.otf` files are considered,
//! 2. if a weight is requested, only files whose name contains it,
//! 3. of those, only the ones closest to the archive root.

use log::debug;

use crate::error::{FontpressError, FontpressResult};
use crate::font::archive::ArchiveEntry;

/// File extensions of font files, compared ASCII case-insensitively.
const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// A weight filter, matched as a substring of a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightQuery(String);

impl WeightQuery {
    /// Create a new query. Returns `None` for blank input.
    pub fn new(weight: &str) -> Option<Self> {
        let weight = weight.trim();
        (!weight.is_empty()).then(|| Self(weight.to_lowercase()))
    }

    /// The lowercased query.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the file name of an entry contains the query.
    pub fn matches(&self, entry: &ArchiveEntry) -> bool {
        entry.file_name().to_lowercase().contains(&self.0)
    }
}

/// The outcome of picking a font file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick<'a> {
    /// Exactly one file is left.
    Single(&'a ArchiveEntry),
    /// Several equally ranked files are left, in archive order.
    Ambiguous(Vec<&'a ArchiveEntry>),
}

impl Pick<'_> {
    /// The paths of all remaining candidates.
    pub fn paths(&self) -> Vec<String> {
        match self {
            Pick::Single(entry) => vec![entry.path().to_string()],
            Pick::Ambiguous(entries) => entries.iter().map(|e| e.path().to_string()).collect(),
        }
    }
}

/// Whether an entry is a font file.
pub fn is_font_file(entry: &ArchiveEntry) -> bool {
    entry.extension().is_some_and(|ext| {
        FONT_EXTENSIONS
            .iter()
            .any(|font_ext| ext.eq_ignore_ascii_case(font_ext))
    })
}

/// Pick the font file to use from a list of archive entries.
pub fn pick<'a>(
    entries: &'a [ArchiveEntry],
    weight: Option<&WeightQuery>,
) -> FontpressResult<Pick<'a>> {
    let mut candidates = entries.iter().filter(|e| is_font_file(e)).collect::<Vec<_>>();

    if candidates.is_empty() {
        return Err(FontpressError::FontNotFound);
    }

    if let Some(weight) = weight {
        candidates.retain(|e| weight.matches(e));

        if candidates.is_empty() {
            return Err(FontpressError::WeightNotFound(weight.as_str().to_string()));
        }
    }

    // Non-empty at this point.
    let min_depth = candidates.iter().map(|e| e.depth()).min().unwrap_or(0);
    candidates.retain(|e| e.depth() == min_depth);

    debug!(
        "{} font candidate(s) at depth {min_depth}: {:?}",
        candidates.len(),
        candidates.iter().map(|e| e.path()).collect::<Vec<_>>()
    );

    match candidates.as_slice() {
        [single] => Ok(Pick::Single(single)),
        _ => Ok(Pick::Ambiguous(candidates)),
    }
}
