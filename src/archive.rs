//! LibArchive - top-level archive handle.
//!
//! Owns the media, the flat entry list produced by one index parse, and
//! (for the encrypted variant) the cipher chosen by the key search. All
//! parsing happens inside `open_*`; afterwards the handle is immutable.

use std::fmt;
use std::sync::Arc;

use crate::crypto::{read_decrypted, BlockCipher, KnownKeys, KEY_SIZE};
use crate::entry::Entry;
use crate::error::{LibError, Result};
use crate::file_media::ByteMedia;
use crate::parsing::{EncryptedIndexParser, PlainIndexParser};

#[cfg(feature = "crypto")]
use crate::crypto::camellia::CamelliaCipher;

/// An opened LIB/LIBP archive.
pub struct LibArchive {
    media: Arc<dyn ByteMedia>,
    entries: Vec<Entry>,
    cipher: Option<Arc<dyn BlockCipher>>,
    key_name: Option<String>,
}

impl LibArchive {
    /// Open a plain (unencrypted) archive.
    ///
    /// Fails with a not-recognized error when the magic does not match;
    /// see [`LibError::is_not_recognized`].
    pub fn open_plain(media: Arc<dyn ByteMedia>) -> Result<Self> {
        let entries = PlainIndexParser::try_read_index(media.as_ref(), "", 0, media.length())?;
        Ok(Self {
            media,
            entries,
            cipher: None,
            key_name: None,
        })
    }

    /// Open an encrypted archive, trying each candidate key in order.
    ///
    /// `build_cipher` constructs a fresh cipher from raw key material; each
    /// trial is fully independent. The first key whose decrypted signature
    /// validates *and* whose index parses completely wins. If no candidate
    /// works the archive is reported as not recognized.
    pub fn open_encrypted_with<C, F>(
        media: Arc<dyn ByteMedia>,
        keys: &KnownKeys,
        mut build_cipher: F,
    ) -> Result<Self>
    where
        C: BlockCipher + 'static,
        F: FnMut(&[u8; KEY_SIZE]) -> C,
    {
        for (name, key) in keys.iter() {
            let cipher = build_cipher(key);
            match EncryptedIndexParser::try_read_index(media.as_ref(), &cipher) {
                Ok(entries) => {
                    return Ok(Self {
                        media,
                        entries,
                        cipher: Some(Arc::new(cipher)),
                        key_name: Some(name.to_string()),
                    });
                }
                // Wrong key, or this key's decryption exposes a malformed
                // index. Either way the next candidate starts clean.
                Err(_) => continue,
            }
        }
        Err(LibError::InvalidSignature)
    }

    /// Open an encrypted archive with the built-in Camellia cipher.
    #[cfg(feature = "crypto")]
    #[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
    pub fn open_encrypted(media: Arc<dyn ByteMedia>, keys: &KnownKeys) -> Result<Self> {
        Self::open_encrypted_with(media, keys, CamelliaCipher::new)
    }

    /// Entries in index order (files only; directories are never emitted).
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Name of the key that validated the signature, if encrypted.
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn media(&self) -> &Arc<dyn ByteMedia> {
        &self.media
    }

    /// Read one entry's bytes, decrypting them for the encrypted variant.
    ///
    /// The entry's range was validated at parse time against the media
    /// length, so a short read here means the media shrank underneath us
    /// and is reported as an invalid offset.
    pub fn read_entry(&self, entry: &Entry) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; entry.size as usize];
        let n = match &self.cipher {
            Some(cipher) => {
                read_decrypted(self.media.as_ref(), cipher.as_ref(), entry.offset, &mut buf)?
            }
            None => self.media.read_at(entry.offset, &mut buf)?,
        };
        if n < buf.len() {
            return Err(LibError::InvalidOffset {
                offset: entry.offset,
                length: self.media.length(),
            });
        }
        Ok(buf)
    }
}

// Trait objects don't derive; summarize instead of dumping entries.
impl fmt::Debug for LibArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibArchive")
            .field("media", &self.media.name())
            .field("entries", &self.entries.len())
            .field("encrypted", &self.is_encrypted())
            .field("key_name", &self.key_name)
            .finish()
    }
}
