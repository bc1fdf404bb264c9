//! Distribution document decryption.
//!
//! Distributable ("view-only") documents keep their sections under
//! `ViewText`, each prefixed with a DISTRIBUTE_DOC_DATA record holding a
//! 256-byte key material block. The block is scrambled with the MSVC C
//! runtime `rand()` sequence seeded from its first four bytes; once
//! descrambled, sixteen of its bytes are the AES-128 key for the rest of the
//! stream, which is encrypted in ECB mode without padding.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, KeyInit};
use aes::Aes128;
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::hwp::format::record::decode_header;
use crate::hwp::types::error::{HwpError, Result};
use crate::hwp::types::tags::HwpTag;

/// Size of the key material block carried by DISTRIBUTE_DOC_DATA.
pub const KEY_MATERIAL_LEN: usize = 256;

/// AES block and key size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Linear congruential generator matching the MSVC `srand`/`rand` pair.
///
/// `state = state * 214013 + 2531011 (mod 2^32)`; each draw yields bits
/// 16..31 of the new state masked to 15 bits.
#[derive(Debug, Clone)]
pub struct MsvcRand {
    state: u32,
}

impl MsvcRand {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_value(&mut self) -> u16 {
        self.state = self.state.wrapping_mul(214_013).wrapping_add(2_531_011);
        ((self.state >> 16) & 0x7FFF) as u16
    }
}

/// Descrambles a key material block in place.
///
/// Draws come in pairs: the first gives the XOR byte `A`, the second the run
/// length `B = (draw & 0xF) + 1`. `A` is applied to the next `B` positions;
/// the last run is cut short at the end of the block.
pub fn descramble_key_material(block: &mut [u8; KEY_MATERIAL_LEN]) {
    let seed = LittleEndian::read_u32(&block[0..4]);
    trace!("Descrambling key material block with seed {:#010x}", seed);

    let mut rng = MsvcRand::new(seed);
    let mut pos = 0;
    while pos < KEY_MATERIAL_LEN {
        let mask = (rng.next_value() & 0xFF) as u8;
        let run = ((rng.next_value() & 0x0F) + 1) as usize;
        let end = (pos + run).min(KEY_MATERIAL_LEN);
        for byte in &mut block[pos..end] {
            *byte ^= mask;
        }
        pos = end;
    }
}

/// Derives the AES key from a key material block as stored in the stream.
///
/// The seed is read before descrambling; the key starts at
/// `(seed & 0xF) + 4` in the descrambled block.
pub fn distribution_key(stored_block: &[u8; KEY_MATERIAL_LEN]) -> [u8; BLOCK_LEN] {
    let seed = LittleEndian::read_u32(&stored_block[0..4]);
    let key_offset = (seed & 0x0F) as usize + 4;

    let mut block = *stored_block;
    descramble_key_material(&mut block);

    let mut key = [0u8; BLOCK_LEN];
    key.copy_from_slice(&block[key_offset..key_offset + BLOCK_LEN]);
    key
}

/// Decrypts `data` in place with AES-128 in ECB mode, no padding.
///
/// # Errors
/// Returns `HwpError::Crypto` if the length is not a multiple of 16.
pub fn aes_ecb_decrypt_in_place(data: &mut [u8], key: &[u8; BLOCK_LEN]) -> Result<()> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(HwpError::Crypto(format!(
            "Ciphertext length {} is not a multiple of the {}-byte block size",
            data.len(),
            BLOCK_LEN
        )));
    }
    trace!("AES-128-ECB decrypting {} bytes", data.len());

    let cipher = Aes128::new(GenericArray::from_slice(key));
    for chunk in data.chunks_exact_mut(BLOCK_LEN) {
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(())
}

/// Decrypts a raw ViewText stream.
///
/// # Stream Layout
/// ```text
/// [4 bytes]   record header: tag DISTRIBUTE_DOC_DATA, size 256
/// [256 bytes] scrambled key material (bytes 0..4 = seed)
/// [N bytes]   AES-128-ECB ciphertext, N % 16 == 0
/// ```
///
/// Returns the plaintext that follows the key material block.
pub fn decrypt_distributed(raw: &[u8]) -> Result<Vec<u8>> {
    let (header, body_start) = decode_header(raw, 0)
        .map_err(|e| HwpError::Crypto(format!("Missing distribution record header: {}", e)))?;

    if header.tag != HwpTag::DistributeDocData.raw() {
        return Err(HwpError::Crypto(format!(
            "Expected DISTRIBUTE_DOC_DATA (tag {}) at stream start, found tag {}",
            HwpTag::DistributeDocData.raw(),
            header.tag
        )));
    }
    if header.size as usize != KEY_MATERIAL_LEN {
        return Err(HwpError::Crypto(format!(
            "Distribution record must carry {} bytes, header declares {}",
            KEY_MATERIAL_LEN, header.size
        )));
    }

    let block_end = body_start + KEY_MATERIAL_LEN;
    let stored: &[u8; KEY_MATERIAL_LEN] = raw
        .get(body_start..block_end)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            HwpError::Crypto(format!(
                "Stream of {} bytes is too short for the key material block",
                raw.len()
            ))
        })?;

    let key = distribution_key(stored);
    debug!("Derived distribution key; decrypting {} bytes", raw.len() - block_end);

    let mut plaintext = raw[block_end..].to_vec();
    aes_ecb_decrypt_in_place(&mut plaintext, &key)?;
    Ok(plaintext)
}
