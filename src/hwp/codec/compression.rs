//! Raw DEFLATE decompression for HWP streams.
//!
//! Compressed documents store every stream except the file header as a bare
//! DEFLATE bit stream: no zlib header, no checksum, and no declared output
//! size, so the output buffer grows as the inflater produces data.

use flate2::{Decompress, FlushDecompress, Status};
use log::trace;

use crate::hwp::types::error::{HwpError, Result};

/// Initial output allocation relative to the compressed size.
const GROWTH_FACTOR: usize = 4;
const MIN_CHUNK: usize = 8 * 1024;

/// Inflates a raw DEFLATE stream.
///
/// Bytes following the final block are ignored (distribution documents pad
/// the compressed data up to the cipher block size).
///
/// # Errors
/// - `HwpError::Transform` if a block is malformed.
/// - `HwpError::TruncatedStream` if the input runs out before the final
///   block has been decoded.
pub fn inflate_raw(payload: &[u8]) -> Result<Vec<u8>> {
    trace!("Inflating {} bytes of raw DEFLATE data", payload.len());

    let mut inflater = Decompress::new(false);
    let mut output = Vec::with_capacity(payload.len().saturating_mul(GROWTH_FACTOR).max(MIN_CHUNK));

    loop {
        if output.len() == output.capacity() {
            output.reserve(output.capacity().max(MIN_CHUNK));
        }

        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let status = inflater
            .decompress_vec(&payload[consumed..], &mut output, FlushDecompress::None)
            .map_err(|e| HwpError::Transform(format!("Corrupt DEFLATE data after {} input bytes: {}", consumed, e)))?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let stalled = inflater.total_in() as usize == consumed && inflater.total_out() == produced;
                if stalled && output.len() < output.capacity() {
                    return Err(HwpError::TruncatedStream {
                        consumed: inflater.total_in() as usize,
                        produced: inflater.total_out() as usize,
                    });
                }
            }
        }
    }

    trace!(
        "Inflated {} bytes -> {} bytes",
        inflater.total_in(),
        output.len()
    );
    Ok(output)
}
