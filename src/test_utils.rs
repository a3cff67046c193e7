//! Test fixtures: synthetic archive builders and a toy tweaked cipher.
//!
//! The builders lay out byte-exact container images in memory so parser
//! tests never depend on fixture files. `XorTweakCipher` stands in for the
//! real block cipher: it is self-inverse and mixes the block offset into
//! the keystream the same way the production cipher does, which is all the
//! aligned reader and the parsers care about.

use std::collections::VecDeque;

use crate::crypto::{BlockCipher, CIPHER_BLOCK_SIZE};
use crate::file_media::MemoryMedia;
use crate::parsing::encrypted_index::{
    DATA_ALIGN, ENCRYPTED_MAGIC, FILE_FLAG, HEADER_SIZE as ENC_HEADER_SIZE,
    RECORD_SIZE as ENC_RECORD_SIZE,
};
use crate::parsing::plain_index::{
    HEADER_SIZE as PLAIN_HEADER_SIZE, NAME_SIZE as PLAIN_NAME_SIZE, PLAIN_MAGIC,
    RECORD_SIZE as PLAIN_RECORD_SIZE,
};

/// Offset-tweaked XOR cipher. Encryption and decryption are the same
/// operation, so fixtures encrypt with `encrypt_all` and parsers decrypt
/// through the `BlockCipher` impl.
#[derive(Debug, Clone, Copy)]
pub(crate) struct XorTweakCipher {
    key: u8,
}

impl XorTweakCipher {
    pub fn new(key: u8) -> Self {
        Self { key }
    }

    fn keystream_byte(self, block_offset: u64, lane: usize) -> u8 {
        let block = (block_offset >> 4) as u8;
        block
            .wrapping_mul(0x9d)
            .wrapping_add((lane as u8).wrapping_mul(0x35))
            ^ self.key
            ^ 0x6c
    }

    /// XOR an entire image with the keystream, byte for byte.
    pub fn encrypt_all(&self, plaintext: &[u8]) -> Vec<u8> {
        plaintext
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                b ^ self.keystream_byte((i as u64) & !0xf, i % CIPHER_BLOCK_SIZE)
            })
            .collect()
    }
}

impl BlockCipher for XorTweakCipher {
    fn decrypt_block(&self, offset: u64, block: &mut [u8]) {
        for (lane, b) in block.iter_mut().enumerate() {
            *b ^= self.keystream_byte(offset, lane);
        }
    }
}

fn put_name(field: &mut [u8], name: &str) {
    let bytes = name.as_bytes();
    let n = bytes.len().min(field.len() - 1);
    field[..n].copy_from_slice(&bytes[..n]);
}

// ---------------------------------------------------------------------------
// Plain variant
// ---------------------------------------------------------------------------

enum PlainItem {
    File { name: String, data: Vec<u8> },
    Dir { name: String, nested: PlainArchiveBuilder },
    Raw { name: String, size: u32, offset: u32 },
}

/// Builds a plain ("LIB\0") archive image.
#[derive(Default)]
pub(crate) struct PlainArchiveBuilder {
    items: Vec<PlainItem>,
}

impl PlainArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.items.push(PlainItem::File {
            name: name.to_string(),
            data: data.to_vec(),
        });
        self
    }

    pub fn dir(mut self, name: &str, f: impl FnOnce(Self) -> Self) -> Self {
        self.items.push(PlainItem::Dir {
            name: name.to_string(),
            nested: f(Self::new()),
        });
        self
    }

    /// Append a record with verbatim size/offset fields and no payload.
    pub fn raw_record(mut self, name: &str, size: u32, offset: u32) -> Self {
        self.items.push(PlainItem::Raw {
            name: name.to_string(),
            size,
            offset,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let table_size = PLAIN_RECORD_SIZE * self.items.len();
        let mut records: Vec<(&str, u32, u32)> = Vec::with_capacity(self.items.len());
        let mut data = Vec::new();
        let mut cursor = (PLAIN_HEADER_SIZE + table_size) as u32;

        for item in &self.items {
            match item {
                PlainItem::File { name, data: bytes } => {
                    records.push((name, bytes.len() as u32, cursor));
                    data.extend_from_slice(bytes);
                    cursor += bytes.len() as u32;
                }
                PlainItem::Dir { name, nested } => {
                    let image = nested.build();
                    records.push((name, image.len() as u32, cursor));
                    cursor += image.len() as u32;
                    data.extend_from_slice(&image);
                }
                PlainItem::Raw { name, size, offset } => {
                    records.push((name, *size, *offset));
                }
            }
        }

        let mut out = vec![0u8; PLAIN_HEADER_SIZE + table_size];
        out[..4].copy_from_slice(&PLAIN_MAGIC);
        out[8..10].copy_from_slice(&(self.items.len() as i16).to_le_bytes());
        for (i, (name, size, offset)) in records.iter().enumerate() {
            let rec = &mut out[PLAIN_HEADER_SIZE + i * PLAIN_RECORD_SIZE..][..PLAIN_RECORD_SIZE];
            put_name(&mut rec[..PLAIN_NAME_SIZE], name);
            rec[36..40].copy_from_slice(&size.to_le_bytes());
            rec[40..44].copy_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&data);
        out
    }

    pub fn into_media(self) -> MemoryMedia {
        MemoryMedia::new("plain.lib", self.build())
    }
}

// ---------------------------------------------------------------------------
// Encrypted variant
// ---------------------------------------------------------------------------

/// One hand-written 32-byte record for malformed-index tests.
pub(crate) struct RawEncRecord {
    pub name: &'static str,
    pub flags: u32,
    pub offset: u32,
    pub size: u32,
}

impl RawEncRecord {
    pub fn dir(name: &'static str, offset: u32, size: u32) -> Self {
        Self {
            name,
            flags: 0,
            offset,
            size,
        }
    }

    pub fn file(name: &'static str, offset: u32, size: u32) -> Self {
        Self {
            name,
            flags: FILE_FLAG,
            offset,
            size,
        }
    }
}

/// Assemble and encrypt a LIBP image from explicit tables. The image is
/// zero-padded to `total_len`, so entry payloads read back as zeros.
pub(crate) fn encrypted_image(
    records: &[RawEncRecord],
    offsets: &[u32],
    total_len: usize,
    cipher: &XorTweakCipher,
) -> Vec<u8> {
    let mut plain = vec![0u8; total_len];
    plain[..4].copy_from_slice(&ENCRYPTED_MAGIC);
    plain[4..8].copy_from_slice(&(records.len() as i32).to_le_bytes());
    plain[8..12].copy_from_slice(&(offsets.len() as i32).to_le_bytes());

    for (i, record) in records.iter().enumerate() {
        let rec = &mut plain[ENC_HEADER_SIZE + i * ENC_RECORD_SIZE..][..ENC_RECORD_SIZE];
        put_name(&mut rec[..20], record.name);
        rec[20..24].copy_from_slice(&record.flags.to_le_bytes());
        rec[24..28].copy_from_slice(&record.offset.to_le_bytes());
        rec[28..32].copy_from_slice(&record.size.to_le_bytes());
    }

    let offsets_base = ENC_HEADER_SIZE + records.len() * ENC_RECORD_SIZE;
    for (i, value) in offsets.iter().enumerate() {
        plain[offsets_base + i * 4..][..4].copy_from_slice(&value.to_le_bytes());
    }

    cipher.encrypt_all(&plain)
}

enum EncItem {
    File { name: String, data: Vec<u8> },
    Dir { name: String, nested: EncryptedArchiveBuilder },
}

/// Builds an encrypted ("LIBP") archive image with real payload placement.
#[derive(Default)]
pub(crate) struct EncryptedArchiveBuilder {
    items: Vec<EncItem>,
}

impl EncryptedArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.items.push(EncItem::File {
            name: name.to_string(),
            data: data.to_vec(),
        });
        self
    }

    pub fn dir(mut self, name: &str, f: impl FnOnce(Self) -> Self) -> Self {
        self.items.push(EncItem::Dir {
            name: name.to_string(),
            nested: f(Self::new()),
        });
        self
    }

    pub fn into_media(self, cipher: &XorTweakCipher) -> MemoryMedia {
        // Flatten the tree breadth-first: each directory's children occupy
        // a contiguous, strictly forward record range.
        let root_count = self.items.len() as u32;
        let mut records: Vec<(String, u32, u32, u32)> =
            vec![(String::new(), 0, 1, root_count)];
        let mut files: Vec<(usize, Vec<u8>)> = Vec::new();
        let mut queue: VecDeque<(usize, Vec<EncItem>)> = VecDeque::from([(0, self.items)]);

        while let Some((parent, items)) = queue.pop_front() {
            records[parent].2 = records.len() as u32;
            for item in items {
                match item {
                    EncItem::File { name, data } => {
                        let index = records.len();
                        records.push((name, FILE_FLAG, 0, data.len() as u32));
                        files.push((index, data));
                    }
                    EncItem::Dir { name, nested } => {
                        let index = records.len();
                        records.push((name, 0, 0, nested.items.len() as u32));
                        queue.push_back((index, nested.items));
                    }
                }
            }
        }

        // One offset-table slot per file; payloads at 1024-byte blocks.
        let mut offsets = Vec::with_capacity(files.len());
        let mut block_cursor = 0u32;
        for (slot, (index, data)) in files.iter().enumerate() {
            records[*index].2 = slot as u32;
            offsets.push(block_cursor);
            block_cursor += (data.len() as u32).div_ceil(1024).max(1);
        }

        let tables_end =
            ENC_HEADER_SIZE as u64 + records.len() as u64 * ENC_RECORD_SIZE as u64 + 4 * offsets.len() as u64;
        let data_start = tables_end.div_ceil(DATA_ALIGN) * DATA_ALIGN;
        let total_len = (data_start + u64::from(block_cursor) * 1024) as usize;

        let mut plain = vec![0u8; total_len];
        plain[..4].copy_from_slice(&ENCRYPTED_MAGIC);
        plain[4..8].copy_from_slice(&(records.len() as i32).to_le_bytes());
        plain[8..12].copy_from_slice(&(offsets.len() as i32).to_le_bytes());
        for (i, (name, flags, offset, size)) in records.iter().enumerate() {
            let rec = &mut plain[ENC_HEADER_SIZE + i * ENC_RECORD_SIZE..][..ENC_RECORD_SIZE];
            put_name(&mut rec[..20], name);
            rec[20..24].copy_from_slice(&flags.to_le_bytes());
            rec[24..28].copy_from_slice(&offset.to_le_bytes());
            rec[28..32].copy_from_slice(&size.to_le_bytes());
        }
        let offsets_base = ENC_HEADER_SIZE + records.len() * ENC_RECORD_SIZE;
        for (i, value) in offsets.iter().enumerate() {
            plain[offsets_base + i * 4..][..4].copy_from_slice(&value.to_le_bytes());
        }
        for ((_, data), block) in files.iter().zip(&offsets) {
            let at = (data_start + u64::from(*block) * 1024) as usize;
            plain[at..at + data.len()].copy_from_slice(data);
        }

        MemoryMedia::new("archive.libp", cipher.encrypt_all(&plain))
    }
}
