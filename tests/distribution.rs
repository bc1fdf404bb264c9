mod common;

use common::*;
use hwp_reader::hwp::format::record::decode_header;
use hwp_reader::hwp::tags::HwpTag;
use hwp_reader::{FileProperties, HwpError, HwpReader, MemoryContainer, NodeId, StreamRole};

const SEED: u32 = 0x1234_5678;

/// ListHeader record (10 bytes) plus a 2-byte opaque record: one AES block.
fn block_aligned_section() -> Vec<u8> {
    let mut plain = record(HwpTag::ListHeader.raw(), 0, &list_header(1, 2));
    plain.extend(record(OPAQUE_TAG, 0, &[0xAB, 0xCD]));
    assert_eq!(plain.len(), 16);
    plain
}

fn distributable(properties: FileProperties, view_sections: &[Vec<u8>]) -> MemoryContainer {
    let compressed = properties.contains(FileProperties::COMPRESSED);
    let doc_info = if compressed { deflate(&doc_info(1)) } else { doc_info(1) };
    let mut container = MemoryContainer::new()
        .with_stream("/FileHeader", header(properties | FileProperties::DISTRIBUTABLE))
        .with_stream("/DocInfo", doc_info)
        // Producers leave a placeholder BodyText next to the real ViewText.
        .with_stream("/BodyText/Section0", vec![0xFF; 7]);
    for (i, section) in view_sections.iter().enumerate() {
        container.insert(&format!("/ViewText/Section{}", i), section.clone());
    }
    container
}

#[test]
fn decrypted_stream_starts_with_the_original_header() {
    let plain = block_aligned_section();
    let container = distributable(FileProperties::empty(), &[encrypt_distributed(&plain, SEED)]);
    let reader = HwpReader::from_container(container).unwrap();

    let decrypted = reader.read_stream(&StreamRole::ViewSection(0)).unwrap();
    assert_eq!(decrypted, plain);
    assert_eq!(decode_header(&decrypted, 0).unwrap(), decode_header(&plain, 0).unwrap());
}

#[test]
fn compressed_view_sections_are_decrypted_then_inflated() {
    let mut plain = paragraph(0, "배포용 문서");
    plain.extend(record(HwpTag::ListHeader.raw(), 1, &list_header(0, 2)));
    let raw = encrypt_distributed(&deflate(&plain), 7);
    let container = distributable(FileProperties::COMPRESSED, &[raw]);

    let reader = HwpReader::from_container(container).unwrap();
    assert_eq!(reader.section_roles().unwrap(), vec![StreamRole::ViewSection(0)]);

    let document = reader.read_document().unwrap();
    assert!(document.failed_sections.is_empty());
    let tree = &document.sections[0].tree;
    assert_eq!(tree.len(), 3);
    assert_eq!(tree[NodeId(1)].payload.as_para_text().unwrap().text, "배포용 문서");
}

#[test]
fn every_seed_nibble_selects_a_working_key() {
    let plain = block_aligned_section();
    for nibble in 0..16u32 {
        let seed = 0xA5A5_A5A0 | nibble;
        let container = distributable(FileProperties::empty(), &[encrypt_distributed(&plain, seed)]);
        let reader = HwpReader::from_container(container).unwrap();
        assert_eq!(reader.read_stream(&StreamRole::ViewSection(0)).unwrap(), plain, "seed {seed:#x}");
    }
}

#[test]
fn missing_distribution_record_is_a_crypto_error() {
    let plain = block_aligned_section();
    let container = distributable(FileProperties::empty(), &[plain]);
    let reader = HwpReader::from_container(container).unwrap();

    let err = reader.read_stream(&StreamRole::ViewSection(0)).unwrap_err();
    assert_eq!(err.stream(), Some("/ViewText/Section0"));
    assert!(matches!(err.root(), HwpError::Crypto(_)));
}

#[test]
fn misaligned_ciphertext_fails_only_its_section() {
    let good = encrypt_distributed(&block_aligned_section(), SEED);
    let mut bad = good.clone();
    bad.extend_from_slice(&[0u8; 5]);
    let container = distributable(FileProperties::empty(), &[good, bad]);

    let document = HwpReader::from_container(container).unwrap().read_document().unwrap();
    assert_eq!(document.sections.len(), 1);
    assert_eq!(document.failed_sections.len(), 1);
    assert_eq!(document.failed_sections[0].name, "Section1");
    assert!(matches!(document.failed_sections[0].error.root(), HwpError::Crypto(_)));
}
