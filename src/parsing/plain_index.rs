//! Plain (unencrypted) index parser.
//!
//! Layout: a 16-byte header (`"LIB\0"` magic, signed 16-bit record count at
//! offset 8) followed by `count` 48-byte records. Each record is a 36-byte
//! NUL-padded name, a 32-bit size and a 32-bit offset relative to the
//! index base. A record whose name has no extension is tried as a *nested*
//! index first (the size/offset pair then describes the nested region);
//! if that parse fails, the same fields are re-read as a plain file entry.

use crate::entry::{join_name, Entry};
use crate::error::{LibError, Result};
use crate::file_media::ByteMedia;

/// Plain index magic: ASCII "LIB" plus a zero byte.
pub const PLAIN_MAGIC: [u8; 4] = *b"LIB\0";

/// Header size; the record table starts here.
pub const HEADER_SIZE: usize = 16;

/// Record stride: 36-byte name + 4-byte size + 4-byte offset.
pub const RECORD_SIZE: usize = 48;

/// Fixed-width name field size.
pub const NAME_SIZE: usize = 36;

/// Nested-index recursion cap. A nested parse deeper than this fails like
/// any malformed nested index and the record falls through to file
/// interpretation, so self-referential indexes cannot recurse forever.
const MAX_DEPTH: usize = 16;

/// One 48-byte record, read straight from the index table.
///
/// The size/offset pair is context dependent: for a record that turns out
/// to be a subdirectory it describes the nested index region, for a file it
/// is the entry's byte length and relative data offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainRecord {
    pub name: String,
    pub size: u32,
    pub offset: u32,
}

impl PlainRecord {
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < RECORD_SIZE {
            return Err(LibError::BufferTooSmall {
                needed: RECORD_SIZE,
                have: buffer.len(),
            });
        }

        let name = fixed_name(&buffer[..NAME_SIZE]);
        let size = u32::from_le_bytes([buffer[36], buffer[37], buffer[38], buffer[39]]);
        let offset = u32::from_le_bytes([buffer[40], buffer[41], buffer[42], buffer[43]]);

        Ok(Self { name, size, offset })
    }

    /// Format quirk: a name without an extension denotes a subdirectory.
    /// A legitimately extension-less filename is indistinguishable from a
    /// directory here; the nested parse attempt (and its fall-through on
    /// failure) is how the format disambiguates.
    pub fn looks_like_directory(&self) -> bool {
        !self.name.contains('.')
    }
}

/// Decode a fixed-width NUL-padded name field.
pub(crate) fn fixed_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Recursive-descent parser for the plain container.
pub struct PlainIndexParser;

impl PlainIndexParser {
    /// Parse the index rooted at `base_offset`, spanning `region_size`
    /// bytes, and return the flat entry list.
    ///
    /// Any invalid file entry aborts the whole parse: a bad range in this
    /// variant means the index layout itself is being misread.
    pub fn try_read_index(
        media: &dyn ByteMedia,
        root_label: &str,
        base_offset: u64,
        region_size: u64,
    ) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        Self::read_index(media, root_label, base_offset, region_size, 0, &mut entries)?;
        Ok(entries)
    }

    fn read_index(
        media: &dyn ByteMedia,
        root_label: &str,
        base_offset: u64,
        region_size: u64,
        depth: usize,
        entries: &mut Vec<Entry>,
    ) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Err(LibError::InvalidHeader);
        }

        let mut header = [0u8; HEADER_SIZE];
        let n = media.read_at(base_offset, &mut header)?;
        if n < 4 || header[..4] != PLAIN_MAGIC {
            return Err(LibError::InvalidSignature);
        }
        if n < 10 {
            return Err(LibError::InvalidHeader);
        }

        let count = i16::from_le_bytes([header[8], header[9]]);
        if count <= 0 {
            return Err(LibError::InvalidHeader);
        }

        let table_size = RECORD_SIZE as u64 * count as u64;
        if (HEADER_SIZE as u64).saturating_add(table_size) > region_size {
            return Err(LibError::InvalidHeader);
        }

        let mut table = vec![0u8; table_size as usize];
        let n = media.read_at(base_offset + HEADER_SIZE as u64, &mut table)?;
        if (n as u64) < table_size {
            return Err(LibError::InvalidHeader);
        }

        let data_start = base_offset + HEADER_SIZE as u64 + table_size;

        for raw in table.chunks_exact(RECORD_SIZE) {
            let record = PlainRecord::parse(raw)?;
            let name = join_name(root_label, &record.name);

            if record.looks_like_directory() {
                // Try the size/offset pair as a nested index region. On
                // failure, roll back anything a partial nested parse
                // appended and fall through to file interpretation.
                let checkpoint = entries.len();
                match Self::read_index(
                    media,
                    &name,
                    base_offset + u64::from(record.offset),
                    u64::from(record.size),
                    depth + 1,
                    entries,
                ) {
                    Ok(()) => continue,
                    Err(_) => entries.truncate(checkpoint),
                }
            }

            let absolute = base_offset + u64::from(record.offset);
            let end = absolute + u64::from(record.size);
            if absolute < data_start
                || absolute >= base_offset + region_size
                || end > media.length()
            {
                return Err(LibError::InvalidOffset {
                    offset: absolute,
                    length: media.length(),
                });
            }

            entries.push(Entry::new(name, absolute, u64::from(record.size)));
        }

        Ok(())
    }
}
