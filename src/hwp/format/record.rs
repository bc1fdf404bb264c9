//! Record header decoding.
//!
//! Every HWP stream is a flat sequence of records, each introduced by a
//! little-endian 32-bit header word:
//!
//! ```text
//!  31          20 19          10 9            0
//! ┌──────────────┬──────────────┬──────────────┐
//! │ size (12)    │ level (10)   │ tag (10)     │
//! └──────────────┴──────────────┴──────────────┘
//! ```
//!
//! A size field of `0xFFF` means the real size follows as a second
//! little-endian 32-bit word.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::hwp::types::error::{HwpError, Result};

const TAG_MASK: u32 = 0x3FF;
const LEVEL_MASK: u32 = 0x3FF;
const LEVEL_SHIFT: u32 = 10;
const SIZE_SHIFT: u32 = 20;

/// Size field value that escapes to the extended 32-bit size word.
pub const EXTENDED_SIZE: u32 = 0xFFF;

const BASE_HEADER_LEN: usize = 4;
const EXTENDED_HEADER_LEN: usize = 8;

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHeader {
    pub tag: u16,
    pub level: u16,
    /// Payload size in bytes (the extended size when one was present).
    pub size: u32,
}

impl RecordHeader {
    pub fn new(tag: u16, level: u16, size: u32) -> Self {
        Self { tag, level, size }
    }

    /// Number of header bytes this record occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        if self.size >= EXTENDED_SIZE {
            EXTENDED_HEADER_LEN
        } else {
            BASE_HEADER_LEN
        }
    }

    /// Appends this header in wire layout. Sizes of `0xFFF` and above use the
    /// extended form. Tag and level are truncated to 10 bits.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let size_field = self.size.min(EXTENDED_SIZE);
        let word = (self.tag as u32 & TAG_MASK)
            | ((self.level as u32 & LEVEL_MASK) << LEVEL_SHIFT)
            | (size_field << SIZE_SHIFT);
        out.extend_from_slice(&word.to_le_bytes());
        if size_field == EXTENDED_SIZE {
            out.extend_from_slice(&self.size.to_le_bytes());
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }
}

/// Decodes the record header starting at `cursor`.
///
/// Returns the header and the cursor position of the first payload byte.
///
/// # Errors
/// `HwpError::TruncatedRecord` if fewer than 4 bytes (8 for an extended
/// header) remain.
pub fn decode_header(bytes: &[u8], cursor: usize) -> Result<(RecordHeader, usize)> {
    let available = bytes.len().saturating_sub(cursor);
    if available < BASE_HEADER_LEN {
        return Err(HwpError::TruncatedRecord {
            offset: cursor,
            needed: BASE_HEADER_LEN,
            available,
        });
    }

    let word = LittleEndian::read_u32(&bytes[cursor..cursor + BASE_HEADER_LEN]);
    let tag = (word & TAG_MASK) as u16;
    let level = ((word >> LEVEL_SHIFT) & LEVEL_MASK) as u16;
    let size_field = word >> SIZE_SHIFT;

    if size_field != EXTENDED_SIZE {
        return Ok((RecordHeader { tag, level, size: size_field }, cursor + BASE_HEADER_LEN));
    }

    if available < EXTENDED_HEADER_LEN {
        return Err(HwpError::TruncatedRecord {
            offset: cursor,
            needed: EXTENDED_HEADER_LEN,
            available,
        });
    }
    let size = LittleEndian::read_u32(&bytes[cursor + BASE_HEADER_LEN..cursor + EXTENDED_HEADER_LEN]);
    Ok((RecordHeader { tag, level, size }, cursor + EXTENDED_HEADER_LEN))
}

/// A record whose payload has not been interpreted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub header: RecordHeader,
    /// Offset of the record header within its stream.
    pub offset: usize,
    /// Offset of the first payload byte within its stream.
    pub payload_offset: usize,
    pub payload: &'a [u8],
}

/// Iterator over the records of a canonical stream.
///
/// Yields `Result<Record>`; after the first error it yields nothing more,
/// since a broken header leaves no reliable position to resume from.
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    data: &'a [u8],
    cursor: usize,
    failed: bool,
}

impl<'a> RecordIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0, failed: false }
    }

    fn read_record(&mut self) -> Result<Record<'a>> {
        let offset = self.cursor;
        let (header, payload_start) = decode_header(self.data, offset)?;
        let available = self.data.len() - payload_start;
        let size = header.size as usize;
        if size > available {
            return Err(HwpError::TruncatedRecord {
                offset: payload_start,
                needed: size,
                available,
            });
        }
        trace!(
            "Record at {}: tag={}, level={}, size={}",
            offset,
            header.tag,
            header.level,
            header.size
        );
        self.cursor = payload_start + size;
        Ok(Record {
            header,
            offset,
            payload_offset: payload_start,
            payload: &self.data[payload_start..payload_start + size],
        })
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.data.len() {
            return None;
        }
        let result = self.read_record();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
