//! Record payload decoding.
//!
//! [`decode_payload`] is the single dispatcher from tag to decoder. Each
//! decoder reads a packed little-endian structure, checks up front that its
//! fixed fields are present, and ignores anything past the fields it knows
//! so that later format revisions can append data. Tags without a decoder,
//! including tags this reader has never heard of, become
//! [`Payload::Opaque`].

use std::fmt;

use encoding_rs::UTF_16LE;
use log::trace;

use crate::hwp::types::error::{HwpError, Result};
use crate::hwp::types::models::Version;
use crate::hwp::types::tags::HwpTag;
use crate::hwp::utils;

/// Decoded content of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    DocumentProperties(DocumentProperties),
    ParaHeader(ParaHeader),
    ParaText(ParaText),
    CtrlHeader(CtrlHeader),
    ListHeader(ListHeader),
    /// Raw bytes of a record without a decoder.
    Opaque { tag: u16, bytes: Vec<u8> },
}

impl Payload {
    pub fn tag(&self) -> u16 {
        match self {
            Payload::DocumentProperties(_) => HwpTag::DocumentProperties.raw(),
            Payload::ParaHeader(_) => HwpTag::ParaHeader.raw(),
            Payload::ParaText(_) => HwpTag::ParaText.raw(),
            Payload::CtrlHeader(_) => HwpTag::CtrlHeader.raw(),
            Payload::ListHeader(_) => HwpTag::ListHeader.raw(),
            Payload::Opaque { tag, .. } => *tag,
        }
    }

    pub fn as_list_header(&self) -> Option<&ListHeader> {
        match self {
            Payload::ListHeader(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_para_text(&self) -> Option<&ParaText> {
        match self {
            Payload::ParaText(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Payload::Opaque { .. })
    }
}

/// Decodes the payload of a record with the given tag.
///
/// `offset` is the stream offset of the payload, used for error context.
/// `version` gates fields that only exist in newer format revisions.
///
/// # Errors
/// `HwpError::MalformedPayload` if the payload is shorter than the fixed
/// fields of a known record type. Unknown tags never fail.
pub fn decode_payload(tag: u16, payload: &[u8], offset: usize, version: Version) -> Result<Payload> {
    let decoded = match HwpTag::from_raw(tag) {
        Some(HwpTag::DocumentProperties) => Payload::DocumentProperties(DocumentProperties::decode(payload, offset)?),
        Some(HwpTag::ParaHeader) => Payload::ParaHeader(ParaHeader::decode(payload, offset, version)?),
        Some(HwpTag::ParaText) => Payload::ParaText(ParaText::decode(payload, offset)?),
        Some(HwpTag::CtrlHeader) => Payload::CtrlHeader(CtrlHeader::decode(payload, offset)?),
        Some(HwpTag::ListHeader) => Payload::ListHeader(ListHeader::decode(payload, offset)?),
        Some(_) | None => {
            trace!("Keeping {} bytes of tag {} as opaque payload", payload.len(), tag);
            Payload::Opaque { tag, bytes: payload.to_vec() }
        }
    };
    Ok(decoded)
}

/// Vertical alignment of a paragraph list (two bits of the list attribute word).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Bottom,
    Center,
    Other(u8),
}

impl VerticalAlign {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => VerticalAlign::Top,
            1 => VerticalAlign::Bottom,
            2 => VerticalAlign::Center,
            other => VerticalAlign::Other(other),
        }
    }
}

impl fmt::Display for VerticalAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerticalAlign::Top => f.write_str("TOP"),
            VerticalAlign::Bottom => f.write_str("BOTTOM"),
            VerticalAlign::Center => f.write_str("CENTER"),
            VerticalAlign::Other(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// LIST_HEADER: introduces a list of paragraphs (table cell, text box,
/// header/footer body).
///
/// ```text
/// [2 bytes] paragraph count (i16)
/// [4 bytes] attribute word; bits 21..23 = vertical alignment
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub paragraph_count: i16,
    pub attributes: u32,
    pub vertical_align: VerticalAlign,
}

impl ListHeader {
    pub const MIN_LEN: usize = 6;
    const VALIGN_SHIFT: u32 = 21;
    const VALIGN_MASK: u32 = 0x03;

    pub fn decode(payload: &[u8], offset: usize) -> Result<Self> {
        utils::require_len(HwpTag::ListHeader.raw(), offset, payload, Self::MIN_LEN)?;
        let mut reader = payload;
        let paragraph_count = utils::read_i16(&mut reader)?;
        let attributes = utils::read_u32(&mut reader)?;
        let vertical_align = VerticalAlign::from_code(((attributes >> Self::VALIGN_SHIFT) & Self::VALIGN_MASK) as u8);
        trace!(
            "LIST_HEADER: paragraphs={}, attributes={:#x}, valign={}",
            paragraph_count,
            attributes,
            vertical_align
        );
        Ok(Self {
            paragraph_count,
            attributes,
            vertical_align,
        })
    }

    /// Number of list paragraphs that follow this header; negative counts
    /// are treated as empty.
    pub fn item_count(&self) -> usize {
        self.paragraph_count.max(0) as usize
    }
}

/// DOCUMENT_PROPERTIES: section count, starting numbers and caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentProperties {
    pub section_count: u16,
    pub page_start: u16,
    pub footnote_start: u16,
    pub endnote_start: u16,
    pub picture_start: u16,
    pub table_start: u16,
    pub equation_start: u16,
    pub caret_list_id: u32,
    pub caret_para_id: u32,
    pub caret_char_pos: u32,
}

impl DocumentProperties {
    pub const MIN_LEN: usize = 26;

    pub fn decode(payload: &[u8], offset: usize) -> Result<Self> {
        utils::require_len(HwpTag::DocumentProperties.raw(), offset, payload, Self::MIN_LEN)?;
        let mut reader = payload;
        Ok(Self {
            section_count: utils::read_u16(&mut reader)?,
            page_start: utils::read_u16(&mut reader)?,
            footnote_start: utils::read_u16(&mut reader)?,
            endnote_start: utils::read_u16(&mut reader)?,
            picture_start: utils::read_u16(&mut reader)?,
            table_start: utils::read_u16(&mut reader)?,
            equation_start: utils::read_u16(&mut reader)?,
            caret_list_id: utils::read_u32(&mut reader)?,
            caret_para_id: utils::read_u32(&mut reader)?,
            caret_char_pos: utils::read_u32(&mut reader)?,
        })
    }
}

/// PARA_HEADER: opens a paragraph; its text, shapes and controls follow as
/// child records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParaHeader {
    pub char_count: u32,
    /// Bit 31 of the character count word.
    pub last_in_list: bool,
    pub control_mask: u32,
    pub para_shape_id: u16,
    pub style_id: u8,
    pub break_kind: u8,
    pub char_shape_count: u16,
    pub range_tag_count: u16,
    pub line_seg_count: u16,
    pub instance_id: u32,
    /// Present from 5.0.3.2 onwards.
    pub track_change_merge: Option<u16>,
}

impl ParaHeader {
    pub const MIN_LEN: usize = 22;
    const TRACK_CHANGE_SINCE: Version = Version::new(5, 0, 3, 2);
    const LAST_IN_LIST_BIT: u32 = 0x8000_0000;

    pub fn decode(payload: &[u8], offset: usize, version: Version) -> Result<Self> {
        utils::require_len(HwpTag::ParaHeader.raw(), offset, payload, Self::MIN_LEN)?;
        let mut reader = payload;
        let raw_count = utils::read_u32(&mut reader)?;
        let control_mask = utils::read_u32(&mut reader)?;
        let para_shape_id = utils::read_u16(&mut reader)?;
        let style_id = utils::read_u8(&mut reader)?;
        let break_kind = utils::read_u8(&mut reader)?;
        let char_shape_count = utils::read_u16(&mut reader)?;
        let range_tag_count = utils::read_u16(&mut reader)?;
        let line_seg_count = utils::read_u16(&mut reader)?;
        let instance_id = utils::read_u32(&mut reader)?;

        let track_change_merge = if version >= Self::TRACK_CHANGE_SINCE && reader.len() >= 2 {
            Some(utils::read_u16(&mut reader)?)
        } else {
            None
        };

        Ok(Self {
            char_count: raw_count & !Self::LAST_IN_LIST_BIT,
            last_in_list: raw_count & Self::LAST_IN_LIST_BIT != 0,
            control_mask,
            para_shape_id,
            style_id,
            break_kind,
            char_shape_count,
            range_tag_count,
            line_seg_count,
            instance_id,
            track_change_merge,
        })
    }
}

/// PARA_TEXT: UTF-16LE paragraph text interleaved with control characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParaText {
    pub text: String,
    /// Codes of extended controls (tables, pictures, section definitions...)
    /// in order of appearance. Their details live in CTRL_HEADER records.
    pub controls: Vec<u16>,
}

/// Width in code units of inline and extended control characters.
const WIDE_CONTROL_UNITS: usize = 8;

enum ControlKind {
    /// Occupies one code unit.
    Char,
    /// Occupies eight code units; no separate object.
    Inline,
    /// Occupies eight code units; points at a CTRL_HEADER child record.
    Extended,
}

fn control_kind(code: u16) -> ControlKind {
    match code {
        0 | 10 | 13 | 24..=31 => ControlKind::Char,
        4..=9 | 19 | 20 => ControlKind::Inline,
        _ => ControlKind::Extended,
    }
}

impl ParaText {
    pub fn decode(payload: &[u8], offset: usize) -> Result<Self> {
        let tag = HwpTag::ParaText.raw();
        if payload.len() % 2 != 0 {
            return Err(HwpError::MalformedPayload {
                tag,
                offset,
                expected: payload.len() + 1,
                found: payload.len(),
            });
        }

        let units = payload.len() / 2;
        let unit_at = |i: usize| u16::from_le_bytes([payload[2 * i], payload[2 * i + 1]]);

        let mut decoded = ParaText::default();
        let mut run_start = 0;
        let mut i = 0;
        while i < units {
            let code = unit_at(i);
            if code >= 32 {
                i += 1;
                continue;
            }

            decoded.push_run(&payload[2 * run_start..2 * i]);
            match control_kind(code) {
                ControlKind::Char => {
                    match code {
                        10 => decoded.text.push('\n'),
                        24 => decoded.text.push('-'),
                        30 | 31 => decoded.text.push(' '),
                        _ => {}
                    }
                    i += 1;
                }
                kind @ (ControlKind::Inline | ControlKind::Extended) => {
                    if i + WIDE_CONTROL_UNITS > units {
                        return Err(HwpError::MalformedPayload {
                            tag,
                            offset,
                            expected: 2 * (i + WIDE_CONTROL_UNITS),
                            found: payload.len(),
                        });
                    }
                    if let ControlKind::Extended = kind {
                        decoded.controls.push(code);
                    } else if code == 9 {
                        decoded.text.push('\t');
                    }
                    i += WIDE_CONTROL_UNITS;
                }
            }
            run_start = i;
        }
        decoded.push_run(&payload[2 * run_start..]);
        Ok(decoded)
    }

    fn push_run(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let (run, _) = UTF_16LE.decode_without_bom_handling(bytes);
        self.text.push_str(&run);
    }
}

/// CTRL_HEADER: identifies an extended control by its four-character id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtrlHeader {
    pub ctrl_id: u32,
    /// Control-specific fields, left undecoded.
    pub body: Vec<u8>,
}

impl CtrlHeader {
    pub const MIN_LEN: usize = 4;

    pub fn decode(payload: &[u8], offset: usize) -> Result<Self> {
        utils::require_len(HwpTag::CtrlHeader.raw(), offset, payload, Self::MIN_LEN)?;
        let mut reader = payload;
        let ctrl_id = utils::read_u32(&mut reader)?;
        Ok(Self {
            ctrl_id,
            body: reader.to_vec(),
        })
    }

    /// The id as its four ASCII characters, e.g. `"tbl "` or `"secd"`.
    pub fn ctrl_id_str(&self) -> String {
        self.ctrl_id
            .to_be_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }
}
