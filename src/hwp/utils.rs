//! Low-level byte reading utilities

use byteorder::{LittleEndian, ReadBytesExt};

use super::types::error::{HwpError, Result};

/// Fails with `MalformedPayload` when `payload` is shorter than `min` bytes.
///
/// Decoders call this once up front for their fixed fields, after which the
/// sequential reads below cannot run out of input.
pub fn require_len(tag: u16, offset: usize, payload: &[u8], min: usize) -> Result<()> {
    if payload.len() < min {
        return Err(HwpError::MalformedPayload {
            tag,
            offset,
            expected: min,
            found: payload.len(),
        });
    }
    Ok(())
}

pub fn read_u8(reader: &mut &[u8]) -> Result<u8> {
    Ok(reader.read_u8()?)
}

pub fn read_u16(reader: &mut &[u8]) -> Result<u16> {
    Ok(reader.read_u16::<LittleEndian>()?)
}

pub fn read_i16(reader: &mut &[u8]) -> Result<i16> {
    Ok(reader.read_i16::<LittleEndian>()?)
}

pub fn read_u32(reader: &mut &[u8]) -> Result<u32> {
    Ok(reader.read_u32::<LittleEndian>()?)
}

/// Numeric suffix of a section stream name (`"Section12"` → `12`).
pub fn section_index(name: &str) -> Option<usize> {
    name.strip_prefix("Section")?.parse().ok()
}
