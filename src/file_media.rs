//! ByteMedia trait - abstract byte source for archive reading.

use crate::error::Result;
use std::io::{Read, Seek, SeekFrom};

/// Abstract random-access byte source.
///
/// Implement this trait for custom sources (e.g. HTTP range requests).
/// The library provides [`LocalFileMedia`] for local files and
/// [`MemoryMedia`] for in-memory buffers.
///
/// `read_at` fills as much of `buf` as the source allows and returns the
/// number of bytes actually read. Reads that start or extend beyond the end
/// of the source must return a short count (possibly 0), never an error —
/// the aligned cipher reader relies on this to detect truncated archives.
pub trait ByteMedia: Send + Sync {
    /// Total length of the source in bytes.
    fn length(&self) -> u64;

    /// Human-readable name, used in diagnostics only.
    fn name(&self) -> &str;

    /// Read up to `buf.len()` bytes starting at `offset`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;
}

/// Local file implementation.
#[derive(Debug, Clone)]
pub struct LocalFileMedia {
    path: String,
    name: String,
    length: u64,
}

impl LocalFileMedia {
    pub fn new(path: &str) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            path: path.to_string(),
            name,
            length: metadata.len(),
        })
    }
}

impl ByteMedia for LocalFileMedia {
    fn length(&self) -> u64 {
        self.length
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset >= self.length {
            return Ok(0);
        }
        let mut file = std::fs::File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        // Fill as much of the buffer as the file allows.
        let mut total = 0;
        while total < buf.len() {
            let n = file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }
}

/// In-memory implementation, mainly for tests and fuzzing.
#[derive(Debug, Clone)]
pub struct MemoryMedia {
    name: String,
    data: Vec<u8>,
}

impl MemoryMedia {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }
}

impl ByteMedia for MemoryMedia {
    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.data.len() {
            return Ok(0);
        }
        let end = (start + buf.len()).min(self.data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.data[start..end]);
        Ok(n)
    }
}
