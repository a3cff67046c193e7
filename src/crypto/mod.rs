//! Cryptographic support for encrypted (LIBP) archives.
//!
//! The container encrypts its index and file data with a block cipher that
//! operates on 16-byte blocks and mixes the absolute byte offset of each
//! block into the transform. The cipher is a black box to the parsers: they
//! only see the [`BlockCipher`] trait and go through
//! [`read_decrypted`](aligned::read_decrypted) for every read.
//!
//! The concrete cipher shipped behind the `crypto` feature is Camellia-128
//! with an XEX-style offset tweak; see [`camellia`].

pub mod aligned;

#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod camellia;

pub use aligned::read_decrypted;

/// Cipher block size in bytes. All block offsets handed to
/// [`BlockCipher::decrypt_block`] are multiples of this.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Key material length in bytes.
pub const KEY_SIZE: usize = 16;

/// Offset-tweaked block cipher over 16-byte blocks.
///
/// `decrypt_block` mutates exactly [`CIPHER_BLOCK_SIZE`] bytes in place.
/// The transform depends on `offset`, the absolute byte position of the
/// block within the media — two identical ciphertext blocks at different
/// offsets decrypt to different plaintext. Implementations must be
/// stateless across calls so blocks can be decrypted in any order.
pub trait BlockCipher: Send + Sync {
    /// Decrypt one block in place. `block.len()` is always
    /// [`CIPHER_BLOCK_SIZE`] and `offset` is block-aligned.
    fn decrypt_block(&self, offset: u64, block: &mut [u8]);
}

/// Ordered set of candidate decryption keys.
///
/// Encrypted archives carry no key identifier, so opening one means trying
/// each known key until the decrypted signature validates. Keys are tried
/// in insertion order, which keeps the search deterministic.
#[derive(Debug, Clone, Default)]
pub struct KnownKeys {
    entries: Vec<(String, [u8; KEY_SIZE])>,
}

impl KnownKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named key candidate. Later duplicates of a name are kept;
    /// the earlier insertion still wins the trial order.
    pub fn insert(&mut self, name: &str, key: [u8; KEY_SIZE]) {
        self.entries.push((name.to_string(), key));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Candidates in trial order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8; KEY_SIZE])> {
        self.entries.iter().map(|(name, key)| (name.as_str(), key))
    }
}

impl<'a> FromIterator<(&'a str, [u8; KEY_SIZE])> for KnownKeys {
    fn from_iter<T: IntoIterator<Item = (&'a str, [u8; KEY_SIZE])>>(iter: T) -> Self {
        let mut keys = Self::new();
        for (name, key) in iter {
            keys.insert(name, key);
        }
        keys
    }
}
