//! Reading font files out of ZIP archives.
//!
//! Only what is needed to pull a font out of a typical download is supported:
//! stored and deflated entries, no encryption, no ZIP64 and no multi-disk
//! archives. Entries are listed from the central directory and decompressed
//! only when they are read.

use flate2::Crc;
use log::{debug, warn};

use crate::error::{FontpressError, FontpressResult};

/// The signature at the start of every ZIP local file header.
pub const ZIP_MAGIC: [u8; 2] = [0x50, 0x4B];

const LOCAL_HEADER_SIGNATURE: u32 = 0x04034b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x02014b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06054b50;

const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_OF_CENTRAL_DIRECTORY_LEN: usize = 22;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

const FLAG_ENCRYPTED: u16 = 1;

/// Whether some bytes look like a ZIP archive.
pub fn is_archive(data: &[u8]) -> bool {
    data.starts_with(&ZIP_MAGIC)
}

/// A file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    path: String,
    depth: usize,
    index: usize,
}

impl ArchiveEntry {
    /// Create a new entry. `index` identifies the entry for
    /// [`Archive::read`]; backslashes in `path` are treated as separators.
    pub fn new(path: &str, index: usize) -> Self {
        let path = path.replace('\\', "/");
        let depth = path.matches('/').count();

        Self { path, depth, index }
    }

    /// The path of the entry within the archive.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The number of path separators in the path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The index of the entry in its archive.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The last component of the path.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The extension of the file name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// A collection of files whose contents are read on demand.
pub trait Archive {
    /// All file entries, in archive order.
    fn entries(&self) -> &[ArchiveEntry];
    /// Read the contents of one entry.
    fn read(&self, entry: &ArchiveEntry) -> FontpressResult<Vec<u8>>;
}

#[derive(Debug, Clone, Copy)]
struct EntryLocation {
    method: u16,
    crc32: u32,
    compressed_size: usize,
    uncompressed_size: usize,
    header_offset: usize,
}

/// A ZIP archive backed by a byte slice.
pub struct ZipArchive<'a> {
    data: &'a [u8],
    entries: Vec<ArchiveEntry>,
    locations: Vec<EntryLocation>,
    max_entry_bytes: usize,
}

impl<'a> ZipArchive<'a> {
    /// Open an archive by reading its central directory.
    ///
    /// Entries larger than `max_entry_bytes` once decompressed can't be read.
    pub fn new(data: &'a [u8], max_entry_bytes: usize) -> FontpressResult<Self> {
        let eocd = find_end_of_central_directory(data).ok_or_else(|| {
            warn!("archive has no end of central directory record");
            FontpressError::FontNotFound
        })?;

        let entry_count = read_u16(data, eocd + 10).ok_or(FontpressError::FontNotFound)? as usize;
        let mut offset = read_u32(data, eocd + 16).ok_or(FontpressError::FontNotFound)? as usize;

        let mut entries = Vec::with_capacity(entry_count);
        let mut locations = Vec::with_capacity(entry_count);

        for _ in 0..entry_count {
            let header = CentralHeader::parse(data, offset).ok_or_else(|| {
                warn!("archive has a malformed central directory at offset {offset}");
                FontpressError::FontNotFound
            })?;
            offset = header.next_offset;

            if header.name.ends_with('/') || header.name.ends_with('\\') {
                continue;
            }

            if header.flags & FLAG_ENCRYPTED != 0 {
                debug!("skipping encrypted archive entry {}", header.name);
                continue;
            }

            if header.location.compressed_size == u32::MAX as usize
                || header.location.uncompressed_size == u32::MAX as usize
            {
                debug!("skipping zip64 archive entry {}", header.name);
                continue;
            }

            entries.push(ArchiveEntry::new(&header.name, locations.len()));
            locations.push(header.location);
        }

        Ok(Self {
            data,
            entries,
            locations,
            max_entry_bytes,
        })
    }
}

impl Archive for ZipArchive<'_> {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn read(&self, entry: &ArchiveEntry) -> FontpressResult<Vec<u8>> {
        let corrupt = |reason: &str| {
            warn!("failed to read archive entry {}: {reason}", entry.path());
            FontpressError::FontNotFound
        };

        let location = *self
            .locations
            .get(entry.index())
            .ok_or_else(|| corrupt("unknown entry"))?;

        if location.uncompressed_size > self.max_entry_bytes {
            return Err(corrupt("entry is too large"));
        }

        let header = location.header_offset;
        if read_u32(self.data, header) != Some(LOCAL_HEADER_SIGNATURE) {
            return Err(corrupt("bad local header signature"));
        }

        let name_len = read_u16(self.data, header + 26).ok_or_else(|| corrupt("truncated"))?;
        let extra_len = read_u16(self.data, header + 28).ok_or_else(|| corrupt("truncated"))?;
        let start = header + LOCAL_HEADER_LEN + name_len as usize + extra_len as usize;
        let raw = self
            .data
            .get(start..start + location.compressed_size)
            .ok_or_else(|| corrupt("truncated"))?;

        let contents = match location.method {
            METHOD_STORED => raw.to_vec(),
            METHOD_DEFLATED => {
                miniz_oxide::inflate::decompress_to_vec_with_limit(raw, self.max_entry_bytes)
                    .map_err(|_| corrupt("invalid deflate stream"))?
            }
            other => return Err(corrupt(&format!("unsupported compression method {other}"))),
        };

        if contents.len() != location.uncompressed_size {
            return Err(corrupt("size mismatch"));
        }

        let mut crc = Crc::new();
        crc.update(&contents);
        if crc.sum() != location.crc32 {
            return Err(corrupt("checksum mismatch"));
        }

        Ok(contents)
    }
}

struct CentralHeader {
    name: String,
    flags: u16,
    location: EntryLocation,
    next_offset: usize,
}

impl CentralHeader {
    fn parse(data: &[u8], offset: usize) -> Option<Self> {
        if read_u32(data, offset)? != CENTRAL_HEADER_SIGNATURE {
            return None;
        }

        let flags = read_u16(data, offset + 8)?;
        let method = read_u16(data, offset + 10)?;
        let crc32 = read_u32(data, offset + 16)?;
        let compressed_size = read_u32(data, offset + 20)? as usize;
        let uncompressed_size = read_u32(data, offset + 24)? as usize;
        let name_len = read_u16(data, offset + 28)? as usize;
        let extra_len = read_u16(data, offset + 30)? as usize;
        let comment_len = read_u16(data, offset + 32)? as usize;
        let header_offset = read_u32(data, offset + 42)? as usize;

        let name_start = offset + CENTRAL_HEADER_LEN;
        let name = String::from_utf8_lossy(data.get(name_start..name_start + name_len)?).into_owned();

        Some(Self {
            name,
            flags,
            location: EntryLocation {
                method,
                crc32,
                compressed_size,
                uncompressed_size,
                header_offset,
            },
            next_offset: name_start + name_len + extra_len + comment_len,
        })
    }
}

/// The record is at the very end, followed only by a comment of at most
/// 64 KiB, so search backwards from there.
fn find_end_of_central_directory(data: &[u8]) -> Option<usize> {
    let last = data.len().checked_sub(END_OF_CENTRAL_DIRECTORY_LEN)?;
    let first = last.saturating_sub(MAX_COMMENT_LEN);

    (first..=last)
        .rev()
        .find(|&pos| read_u32(data, pos) == Some(END_OF_CENTRAL_DIRECTORY_SIGNATURE))
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ZipBuilder;

    #[test]
    fn detects_zip_magic() {
        assert!(is_archive(b"PK\x03\x04"));
        assert!(!is_archive(b"\x00\x01\x00\x00"));
        assert!(!is_archive(b"P"));
    }

    #[test]
    fn entry_depth_and_names() {
        let entry = ArchiveEntry::new("Family/static/Family-Bold.TTF", 0);
        assert_eq!(entry.depth(), 2);
        assert_eq!(entry.file_name(), "Family-Bold.TTF");
        assert_eq!(entry.extension(), Some("TTF"));

        let windows = ArchiveEntry::new("Family\\Regular.otf", 1);
        assert_eq!(windows.path(), "Family/Regular.otf");
        assert_eq!(windows.depth(), 1);

        assert_eq!(ArchiveEntry::new("LICENSE", 2).extension(), None);
        assert_eq!(ArchiveEntry::new("trailing.", 3).extension(), None);
    }

    #[test]
    fn lists_files_and_skips_directories() {
        let data = ZipBuilder::new()
            .directory("Family/")
            .stored("Family/Regular.ttf", b"regular")
            .deflated("OFL.txt", b"license text")
            .finish();

        let archive = ZipArchive::new(&data, 1024).unwrap();
        let paths = archive
            .entries()
            .iter()
            .map(|e| e.path())
            .collect::<Vec<_>>();

        assert_eq!(paths, ["Family/Regular.ttf", "OFL.txt"]);
    }

    #[test]
    fn reads_stored_and_deflated_entries() {
        let body = b"abcabcabcabcabcabcabcabcabcabc".repeat(20);
        let data = ZipBuilder::new()
            .stored("a.ttf", &body)
            .deflated("b.otf", &body)
            .finish();

        let archive = ZipArchive::new(&data, 1 << 20).unwrap();
        for entry in archive.entries() {
            assert_eq!(archive.read(entry).unwrap(), body);
        }
    }

    #[test]
    fn oversized_entries_are_refused() {
        let data = ZipBuilder::new().deflated("big.ttf", &[0u8; 4096]).finish();
        let archive = ZipArchive::new(&data, 1024).unwrap();

        assert_eq!(
            archive.read(&archive.entries()[0]),
            Err(FontpressError::FontNotFound)
        );
    }

    #[test]
    fn corrupted_contents_fail_the_checksum() {
        let mut data = ZipBuilder::new().stored("a.ttf", b"hello").finish();
        let pos = data.windows(5).position(|w| w == b"hello").unwrap();
        data[pos] = b'j';

        let archive = ZipArchive::new(&data, 1024).unwrap();
        assert!(archive.read(&archive.entries()[0]).is_err());
    }

    #[test]
    fn truncated_archives_are_rejected() {
        let data = ZipBuilder::new().stored("a.ttf", b"hello").finish();
        assert!(ZipArchive::new(&data[..data.len() - 30], 1024).is_err());
        assert!(ZipArchive::new(b"PK", 1024).is_err());
    }
}
