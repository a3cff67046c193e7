//! Streaming reader for LIB/LIBP resource archives.
//!
//! Parses the hierarchical index of a LIB container into a flat list of
//! named entries with absolute byte offsets and sizes, suitable for
//! on-demand extraction. Two container variants are supported:
//!
//! - **LIB** — plain index, `"LIB\0"` magic, 48-byte records.
//! - **LIBP** — fully encrypted container, `"LIBP"` magic after
//!   decryption, 32-byte records plus an offset table. The decryption key
//!   is not stored in the archive; opening one tries a set of known
//!   candidate keys until the signature validates.
//!
//! The block cipher operates on 16-byte blocks tweaked by their absolute
//! offset; the aligned cipher reader in [`crypto`] adapts it to the
//! arbitrary unaligned reads index parsing needs.
//!
//! ## Features
//! - Core library has **zero dependencies**
//! - `crypto` - Camellia-based cipher for encrypted archives
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lib_stream::{KnownKeys, LibArchive, LocalFileMedia};
//!
//! let media = Arc::new(LocalFileMedia::new("data.lib")?);
//! let archive = LibArchive::open_plain(media)?;
//! for entry in archive.entries() {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod archive;
pub mod crypto;
mod entry;
pub mod error;
mod file_media;
pub mod parsing;

#[cfg(test)]
mod test_utils;

pub use archive::LibArchive;
pub use crypto::{read_decrypted, BlockCipher, KnownKeys, CIPHER_BLOCK_SIZE, KEY_SIZE};
pub use entry::Entry;
pub use error::{LibError, Result};
pub use file_media::{ByteMedia, LocalFileMedia, MemoryMedia};

#[cfg(feature = "crypto")]
pub use crypto::camellia::CamelliaCipher;
