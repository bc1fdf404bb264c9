#![allow(dead_code)]

use std::io::Write;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use hwp_reader::hwp::codec::crypto::{distribution_key, BLOCK_LEN, KEY_MATERIAL_LEN};
use hwp_reader::hwp::format::file_header;
use hwp_reader::hwp::format::record::RecordHeader;
use hwp_reader::hwp::tags::HwpTag;
use hwp_reader::{FileProperties, MemoryContainer, Version};

pub const VERSION: Version = Version::new(5, 1, 0, 1);
pub const OPAQUE_TAG: u16 = 900;

pub fn record(tag: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = RecordHeader::new(tag, level, payload.len() as u32).encode();
    out.extend_from_slice(payload);
    out
}

pub fn list_header(count: i16, valign: u32) -> Vec<u8> {
    let mut bytes = count.to_le_bytes().to_vec();
    bytes.extend_from_slice(&(valign << 21).to_le_bytes());
    bytes
}

pub fn para_header(char_count: u32) -> Vec<u8> {
    let mut bytes = char_count.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 18]);
    bytes
}

pub fn para_text(text: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect();
    bytes.extend_from_slice(&13u16.to_le_bytes());
    bytes
}

/// One paragraph (header + text) at `level`.
pub fn paragraph(level: u16, text: &str) -> Vec<u8> {
    let mut out = record(HwpTag::ParaHeader.raw(), level, &para_header(text.chars().count() as u32 + 1));
    out.extend(record(HwpTag::ParaText.raw(), level + 1, &para_text(text)));
    out
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Wraps `plain` the way distributable documents store ViewText sections.
/// `plain` is zero padded to the AES block size.
pub fn encrypt_distributed(plain: &[u8], seed: u32) -> Vec<u8> {
    let mut stored = [0u8; KEY_MATERIAL_LEN];
    for (i, byte) in stored.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(7).wrapping_add(3);
    }
    stored[0..4].copy_from_slice(&seed.to_le_bytes());
    let key = distribution_key(&stored);

    let mut body = plain.to_vec();
    let padded_len = body.len().div_ceil(BLOCK_LEN) * BLOCK_LEN;
    body.resize(padded_len, 0);
    let cipher = Aes128::new(GenericArray::from_slice(&key));
    for chunk in body.chunks_exact_mut(BLOCK_LEN) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }

    let mut out = record(HwpTag::DistributeDocData.raw(), 0, &stored);
    out.extend(body);
    out
}

pub fn header(properties: FileProperties) -> Vec<u8> {
    file_header::encode(VERSION, properties)
}

/// DocInfo holding a single DOCUMENT_PROPERTIES record.
pub fn doc_info(section_count: u16) -> Vec<u8> {
    let mut payload = section_count.to_le_bytes().to_vec();
    payload.extend_from_slice(&[0u8; 24]);
    record(HwpTag::DocumentProperties.raw(), 0, &payload)
}

/// A plain (uncompressed, not distributable) document.
pub fn plain_document(sections: &[(usize, Vec<u8>)]) -> MemoryContainer {
    let mut container = MemoryContainer::new()
        .with_stream("/FileHeader", header(FileProperties::empty()))
        .with_stream("/DocInfo", doc_info(sections.len() as u16));
    for (index, data) in sections {
        container.insert(&format!("/BodyText/Section{}", index), data.clone());
    }
    container
}
