//! Stream canonicalization: turns a raw container stream into the byte
//! sequence the record decoder expects.

use log::debug;

use super::{compression, crypto};
use crate::hwp::types::error::Result;
use crate::hwp::types::models::TransformFlags;

/// Applies the transforms named by `flags` to a raw stream.
///
/// The order is fixed by the producing application: the ciphertext wraps
/// the compressed data, so decryption always runs before decompression.
///
/// # Errors
/// - `HwpError::Crypto` when the distribution block is missing or the
///   ciphertext is misaligned.
/// - `HwpError::Transform` when a DEFLATE block is malformed.
/// - `HwpError::TruncatedStream` when the DEFLATE data stops before its
///   final block.
pub fn canonicalize(raw: &[u8], flags: TransformFlags) -> Result<Vec<u8>> {
    debug!(
        "Canonicalizing {} bytes (distributable={}, compressed={})",
        raw.len(),
        flags.distributable,
        flags.compressed
    );

    match (flags.distributable, flags.compressed) {
        (false, false) => Ok(raw.to_vec()),
        (false, true) => compression::inflate_raw(raw),
        (true, false) => crypto::decrypt_distributed(raw),
        (true, true) => {
            let decrypted = crypto::decrypt_distributed(raw)?;
            compression::inflate_raw(&decrypted)
        }
    }
}
