//! Codec layer for decryption and decompression.
//!
//! # Submodules
//!
//! - [`crypto`][]: distribution document key derivation and AES-ECB decryption
//! - [`compression`][]: raw DEFLATE inflation
//! - [`transform`][]: picks and orders the two for a given stream

pub mod compression;
pub mod crypto;
pub mod transform;

pub use transform::canonicalize;
