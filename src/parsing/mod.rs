//! Index parsing for both container variants.
//!
//! Both variants share one shape: validate the signature, read a
//! fixed-stride record table, expand directory records recursively, emit
//! file entries. The encrypted variant routes every read through the
//! aligned cipher reader and resolves file offsets through an indirection
//! table; see each submodule for the exact layout.

pub mod encrypted_index;
pub mod plain_index;

pub use encrypted_index::EncryptedIndexParser;
pub use plain_index::PlainIndexParser;
