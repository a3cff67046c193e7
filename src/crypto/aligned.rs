//! Aligned cipher reader - arbitrary byte ranges over a block cipher.
//!
//! The cipher only decrypts whole 16-byte blocks at block-aligned offsets,
//! but index parsing and entry extraction need arbitrary `[offset, len)`
//! ranges. This adapter widens each request to the enclosing block-aligned
//! range, decrypts block by block (each block keyed by its own absolute
//! offset), and hands back exactly the requested slice.

use crate::crypto::{BlockCipher, CIPHER_BLOCK_SIZE};
use crate::error::Result;
use crate::file_media::ByteMedia;

/// Read `dest.len()` bytes of plaintext starting at `offset` from media
/// whose underlying bytes are ciphertext.
///
/// Returns the number of plaintext bytes actually available, which is less
/// than `dest.len()` when the media is shorter than the requested range.
/// Callers treat a short count as a truncated archive; a short *raw* read
/// never surfaces as an error here.
///
/// A raw read that ends mid-block is zero-padded up to the block boundary
/// and decrypted through that final block, so every returned byte is
/// plaintext even when the media length is not 16-aligned.
///
/// When `offset` and `dest.len()` are both block-aligned the ciphertext is
/// read straight into `dest` and decrypted in place, with no scratch
/// allocation.
pub fn read_decrypted(
    media: &dyn ByteMedia,
    cipher: &dyn BlockCipher,
    offset: u64,
    dest: &mut [u8],
) -> Result<usize> {
    let length = dest.len();
    let pad = (offset % CIPHER_BLOCK_SIZE as u64) as usize;

    if pad == 0 && length % CIPHER_BLOCK_SIZE == 0 {
        let n = media.read_at(offset, dest)?;
        let rounded = n.div_ceil(CIPHER_BLOCK_SIZE) * CIPHER_BLOCK_SIZE;
        dest[n..rounded].fill(0);
        decrypt_blocks(cipher, offset, &mut dest[..rounded]);
        return Ok(n);
    }

    let aligned_len = (pad + length).div_ceil(CIPHER_BLOCK_SIZE) * CIPHER_BLOCK_SIZE;
    let base = offset - pad as u64;

    let mut scratch = vec![0u8; aligned_len];
    let n = media.read_at(base, &mut scratch)?;
    if n < pad {
        return Ok(0);
    }
    let rounded = n.div_ceil(CIPHER_BLOCK_SIZE) * CIPHER_BLOCK_SIZE;
    decrypt_blocks(cipher, base, &mut scratch[..rounded]);

    let available = (n - pad).min(length);
    dest[..available].copy_from_slice(&scratch[pad..pad + available]);
    Ok(available)
}

/// Decrypt consecutive whole blocks in place. `base` must be block-aligned
/// and `buf.len()` a multiple of the block size.
fn decrypt_blocks(cipher: &dyn BlockCipher, base: u64, buf: &mut [u8]) {
    for (i, block) in buf.chunks_exact_mut(CIPHER_BLOCK_SIZE).enumerate() {
        cipher.decrypt_block(base + (i * CIPHER_BLOCK_SIZE) as u64, block);
    }
}
