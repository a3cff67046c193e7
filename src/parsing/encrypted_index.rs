//! Encrypted index parser.
//!
//! Every byte of the container is ciphertext; all reads here go through the
//! aligned cipher reader. Layout after decryption:
//!
//! - 16-byte header: `"LIBP"` magic, i32 entry count, i32 offset-table
//!   length, 4 reserved bytes.
//! - Index table: `count` 32-byte records (20-byte NUL-padded name, u32
//!   flags, u32 offset/index, u32 size).
//! - Offset table: `offset_table_length` little-endian u32 values, each a
//!   1024-byte block index into the data region.
//! - Data region, starting at the next 4096-byte boundary.
//!
//! A record with [`FILE_FLAG`] set is a file: its offset field indexes the
//! offset table, and the absolute position is
//! `data_start + table[index] * 1024`. A record without the flag is a
//! subdirectory whose offset/size fields select a child range of the same
//! record table. The walk starts from the single root record at index 0.

use crate::crypto::{read_decrypted, BlockCipher};
use crate::entry::{join_name, Entry};
use crate::error::{LibError, Result};
use crate::file_media::ByteMedia;
use crate::parsing::plain_index::fixed_name;

/// Encrypted index magic, as seen after decrypting offset 0.
pub const ENCRYPTED_MAGIC: [u8; 4] = *b"LIBP";

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Record stride: 20-byte name + 4-byte flags + 4-byte offset + 4-byte size.
pub const RECORD_SIZE: usize = 32;

/// Fixed-width name field size.
pub const NAME_SIZE: usize = 20;

/// Flag bit distinguishing file records from subdirectory records.
pub const FILE_FLAG: u32 = 0x0001_0000;

/// Offset-table values count 1024-byte blocks.
pub const OFFSET_BLOCK_SHIFT: u32 = 10;

/// The data region starts at the next multiple of this after the tables.
pub const DATA_ALIGN: u64 = 4096;

/// One 32-byte record from the index table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    pub name: String,
    pub flags: u32,
    /// Offset-table index (file) or first child record index (directory).
    pub offset: u32,
    /// Byte length (file) or child record count (directory).
    pub size: u32,
}

impl EncryptedRecord {
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < RECORD_SIZE {
            return Err(LibError::BufferTooSmall {
                needed: RECORD_SIZE,
                have: buffer.len(),
            });
        }

        let name = fixed_name(&buffer[..NAME_SIZE]);
        let flags = u32::from_le_bytes([buffer[20], buffer[21], buffer[22], buffer[23]]);
        let offset = u32::from_le_bytes([buffer[24], buffer[25], buffer[26], buffer[27]]);
        let size = u32::from_le_bytes([buffer[28], buffer[29], buffer[30], buffer[31]]);

        Ok(Self {
            name,
            flags,
            offset,
            size,
        })
    }

    pub fn is_file(&self) -> bool {
        self.flags & FILE_FLAG != 0
    }
}

/// Recursive-descent parser for the encrypted container.
pub struct EncryptedIndexParser;

impl EncryptedIndexParser {
    /// Validate the signature under `cipher` and parse the whole index.
    ///
    /// A malformed header or truncated table abandons the parse; an
    /// individual file record with a bad offset-table index or an
    /// out-of-bounds range is skipped so the rest of the archive stays
    /// usable.
    pub fn try_read_index(
        media: &dyn ByteMedia,
        cipher: &dyn BlockCipher,
    ) -> Result<Vec<Entry>> {
        let mut header = [0u8; HEADER_SIZE];
        let n = read_decrypted(media, cipher, 0, &mut header)?;
        if n < HEADER_SIZE || header[..4] != ENCRYPTED_MAGIC {
            return Err(LibError::InvalidSignature);
        }

        let count = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let table_len = i32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        if count <= 0 || table_len < 0 {
            return Err(LibError::InvalidHeader);
        }

        let table_bytes = RECORD_SIZE as u64 * count as u64;
        let offsets_bytes = 4 * table_len as u64;
        let tables_end = HEADER_SIZE as u64 + table_bytes + offsets_bytes;
        if tables_end > media.length() {
            return Err(LibError::InvalidHeader);
        }

        let mut table = vec![0u8; table_bytes as usize];
        let n = read_decrypted(media, cipher, HEADER_SIZE as u64, &mut table)?;
        if (n as u64) < table_bytes {
            return Err(LibError::InvalidHeader);
        }

        let mut raw_offsets = vec![0u8; offsets_bytes as usize];
        let n = read_decrypted(
            media,
            cipher,
            HEADER_SIZE as u64 + table_bytes,
            &mut raw_offsets,
        )?;
        if (n as u64) < offsets_bytes {
            return Err(LibError::InvalidHeader);
        }
        let offsets: Vec<u32> = raw_offsets
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let data_start = tables_end.div_ceil(DATA_ALIGN) * DATA_ALIGN;

        let mut entries = Vec::new();
        Self::walk(&table, &offsets, data_start, media.length(), &mut entries)?;
        Ok(entries)
    }

    /// Expand the record tree rooted at record 0 into flat file entries,
    /// depth first, directories in index order.
    ///
    /// The traversal keeps its own worklist of `(first, end, parent)`
    /// ranges: call-stack recursion would let a long chain of forward
    /// subdirectory references in a valid-looking index overflow the stack.
    fn walk(
        table: &[u8],
        offsets: &[u32],
        data_start: u64,
        media_len: u64,
        entries: &mut Vec<Entry>,
    ) -> Result<()> {
        let total = table.len() / RECORD_SIZE;
        let mut pending: Vec<(usize, usize, String)> = vec![(0, 1usize.min(total), String::new())];

        while let Some((first, end, parent)) = pending.pop() {
            let mut index = first;
            while index < end {
                let record =
                    EncryptedRecord::parse(&table[index * RECORD_SIZE..][..RECORD_SIZE])?;
                let name = join_name(&parent, &record.name);

                if !record.is_file() {
                    // Subdirectory. Only forward references are followed; a
                    // self- or backward-pointing range would never terminate.
                    let child = record.offset as usize;
                    if child > index {
                        // Descend first: the remainder of this range resumes
                        // after the child subtree, keeping entries in
                        // depth-first order.
                        if index + 1 < end {
                            pending.push((index + 1, end, parent.clone()));
                        }
                        let child_end = child.saturating_add(record.size as usize).min(total);
                        pending.push((child.min(total), child_end, name));
                        break;
                    }
                    index += 1;
                    continue;
                }

                // File record: the offset field indexes the offset table.
                if let Some(&block) = offsets.get(record.offset as usize) {
                    let absolute = data_start + (u64::from(block) << OFFSET_BLOCK_SHIFT);
                    let size = u64::from(record.size);
                    if absolute
                        .checked_add(size)
                        .is_some_and(|range_end| range_end <= media_len)
                    {
                        entries.push(Entry::new(name, absolute, size));
                    }
                    // Out-of-bounds file records are skipped, not fatal.
                }
                index += 1;
            }
        }

        Ok(())
    }
}
