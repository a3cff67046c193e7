//! Error types for LIB/LIBP archive parsing.
//!
//! This module provides the [`LibError`] type which covers all possible
//! errors that can occur when opening an archive or reading its index.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Recognition | [`InvalidSignature`] | Source is not a LIB/LIBP archive (or no key matched) |
//! | Structure | [`InvalidHeader`], [`BufferTooSmall`] | Index is malformed or truncated |
//! | Bounds | [`InvalidOffset`] | An entry points outside the archive |
//! | I/O | [`Io`] | Read errors from the underlying media |
//!
//! Recognition failures are not errors in the usual sense: a caller probing
//! several container formats should check [`LibError::is_not_recognized`]
//! and move on to the next handler instead of reporting a failure.
//!
//! [`InvalidSignature`]: LibError::InvalidSignature
//! [`InvalidHeader`]: LibError::InvalidHeader
//! [`BufferTooSmall`]: LibError::BufferTooSmall
//! [`InvalidOffset`]: LibError::InvalidOffset
//! [`Io`]: LibError::Io

use std::fmt;
use std::io;

/// Error type for LIB/LIBP operations.
///
/// # Example
///
/// ```rust,ignore
/// use lib_stream::{LibArchive, LibError};
///
/// match LibArchive::open_plain(media) {
///     Ok(archive) => println!("Found {} entries", archive.entries().len()),
///     Err(e) if e.is_not_recognized() => { /* try another format handler */ }
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
#[derive(Debug)]
pub enum LibError {
    /// The source does not carry a valid LIB/LIBP signature.
    ///
    /// For the encrypted variant this is also returned when none of the
    /// candidate keys produces the `LIBP` magic at offset 0.
    InvalidSignature,

    /// The index is structurally malformed.
    ///
    /// Covers a non-positive entry count, an index table larger than its
    /// declared region, and truncated header/table reads.
    InvalidHeader,

    /// The provided buffer or record slice is too small.
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        have: usize,
    },

    /// A file record resolved to a byte range outside the archive.
    ///
    /// Only the plain variant produces this: a bad entry there means the
    /// whole index layout is being misread, so the parse fails closed.
    /// The encrypted variant skips bad records instead.
    InvalidOffset {
        /// The resolved absolute offset.
        offset: u64,
        /// The media length it was validated against.
        length: u64,
    },

    /// An I/O error occurred on the underlying media.
    Io(io::Error),
}

impl LibError {
    /// Whether this failure means "not this format / not this key" rather
    /// than a real error. Format-probing callers should try the next
    /// handler when this returns `true`.
    pub fn is_not_recognized(&self) -> bool {
        matches!(self, Self::InvalidSignature)
    }
}

impl fmt::Display for LibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "Invalid LIB/LIBP signature"),
            Self::InvalidHeader => write!(f, "Invalid or malformed index"),
            Self::BufferTooSmall { needed, have } => {
                write!(f, "Buffer too small: need {} bytes, have {}", needed, have)
            }
            Self::InvalidOffset { offset, length } => {
                write!(f, "Invalid offset: {} (media length: {})", offset, length)
            }
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LibError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LibError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, LibError>;
