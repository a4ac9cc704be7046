//! Turning a font source into a parsed font.

use std::time::Duration;

use log::{debug, info};

use crate::configure::{AmbiguityPolicy, Settings};
use crate::error::{FontpressError, FontpressResult};
use crate::font::archive::{is_archive, Archive, ZipArchive};
use crate::font::fetch::{Fetch, Fetched};
use crate::font::picker::{pick, Pick, WeightQuery};
use crate::font::source::FontSource;
use crate::font::Font;
use crate::Data;

/// The outcome of resolving a payload to font bytes.
#[derive(Debug, Clone)]
pub enum ResolvedFont {
    /// The bytes of the one font file to use.
    Single(Data),
    /// The archive paths of several equally ranked font files.
    Ambiguous(Vec<String>),
}

/// A downloaded font payload, either a font file or an archive.
#[derive(Debug, Clone)]
pub struct RawFontPayload {
    data: Data,
    download_time: Duration,
    max_entry_bytes: usize,
}

impl RawFontPayload {
    /// Wrap a downloaded body. Archive entries larger than `max_entry_bytes`
    /// won't be decompressed.
    pub fn new(fetched: Fetched, max_entry_bytes: usize) -> Self {
        Self {
            data: fetched.bytes.into(),
            download_time: fetched.elapsed,
            max_entry_bytes,
        }
    }

    /// Whether the payload is a ZIP archive.
    pub fn is_archive(&self) -> bool {
        is_archive(self.data.as_ref())
    }

    /// How long the download took.
    pub fn download_time(&self) -> Duration {
        self.download_time
    }

    /// Decide which font file of the payload to use.
    ///
    /// A payload that isn't an archive is used as is, a weight doesn't apply to it.
    pub fn resolve(&self, weight: Option<&WeightQuery>) -> FontpressResult<ResolvedFont> {
        if !self.is_archive() {
            if let Some(weight) = weight {
                debug!("ignoring weight `{}` for a single font file", weight.as_str());
            }

            return Ok(ResolvedFont::Single(self.data.clone()));
        }

        let archive = self.archive()?;

        match pick(archive.entries(), weight)? {
            Pick::Single(entry) => {
                debug!("picked {} from archive", entry.path());
                Ok(ResolvedFont::Single(archive.read(entry)?.into()))
            }
            picked @ Pick::Ambiguous(_) => Ok(ResolvedFont::Ambiguous(picked.paths())),
        }
    }

    /// Read one font file out of the archive, by its path.
    pub fn extract(&self, path: &str) -> FontpressResult<Data> {
        let archive = self.archive()?;
        let entry = archive
            .entries()
            .iter()
            .find(|e| e.path() == path)
            .ok_or(FontpressError::FontNotFound)?;

        archive.read(entry).map(Data::from)
    }

    fn archive(&self) -> FontpressResult<ZipArchive<'_>> {
        ZipArchive::new(self.data.as_ref(), self.max_entry_bytes)
    }
}

/// A parsed font together with how it was found.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    /// The font.
    pub font: Font,
    /// The URL the font was downloaded from.
    pub url: String,
    /// How long the download took.
    pub download_time: Duration,
    /// All candidates, if the selection was ambiguous.
    pub candidates: Option<Vec<String>>,
    /// The candidate that was used, if the selection was ambiguous.
    pub selected: Option<String>,
}

/// Fetches, unpacks and parses fonts.
pub struct FontResolver<F> {
    fetcher: F,
    family_url_template: String,
    max_entry_bytes: usize,
    ambiguity: AmbiguityPolicy,
}

impl<F: Fetch> FontResolver<F> {
    /// Create a new resolver.
    pub fn new(fetcher: F, settings: &Settings) -> Self {
        Self {
            fetcher,
            family_url_template: settings.family_url_template.clone(),
            max_entry_bytes: settings.fetch.max_entry_bytes,
            ambiguity: settings.ambiguity,
        }
    }

    /// The URL a source is downloaded from.
    pub fn url(&self, source: &FontSource) -> String {
        source.url(&self.family_url_template)
    }

    /// Download the payload of a source.
    pub fn fetch(&self, source: &FontSource) -> FontpressResult<RawFontPayload> {
        let fetched = self.fetcher.fetch(&self.url(source))?;
        Ok(RawFontPayload::new(fetched, self.max_entry_bytes))
    }

    /// Download, unpack and parse the font of a source.
    pub fn load(
        &self,
        source: &FontSource,
        weight: Option<&WeightQuery>,
    ) -> FontpressResult<LoadedFont> {
        let url = self.url(source);
        let payload = self.fetch(source)?;

        let (data, candidates, selected) = match payload.resolve(weight)? {
            ResolvedFont::Single(data) => (data, None, None),
            ResolvedFont::Ambiguous(candidates) => match self.ambiguity {
                AmbiguityPolicy::Reject => {
                    return Err(FontpressError::AmbiguousSelection(candidates));
                }
                AmbiguityPolicy::PickFirst => {
                    let first = candidates
                        .first()
                        .cloned()
                        .ok_or(FontpressError::FontNotFound)?;
                    info!(
                        "{} candidates for {url}, using {first}",
                        candidates.len()
                    );
                    (payload.extract(&first)?, Some(candidates), Some(first))
                }
            },
        };

        let font = Font::new(data).ok_or_else(|| {
            debug!("payload from {url} is not a readable font");
            FontpressError::FontNotFound
        })?;

        Ok(LoadedFont {
            font,
            url,
            download_time: payload.download_time(),
            candidates,
            selected,
        })
    }
}
