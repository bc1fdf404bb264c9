mod common;

use common::*;
use hwp_reader::hwp::tags::HwpTag;
use hwp_reader::{FileProperties, HwpError, HwpReader, MemoryContainer, NodeId, Payload, ReaderOptions, StreamRole, VerticalAlign};

#[test]
fn compressed_doc_info_with_list_header() {
    let doc_info = record(HwpTag::ListHeader.raw(), 0, &list_header(3, 2));
    let container = MemoryContainer::new()
        .with_stream("/FileHeader", header(FileProperties::COMPRESSED))
        .with_stream("/DocInfo", deflate(&doc_info))
        .with_stream("/BodyText/Section0", deflate(&paragraph(0, "hello")));

    let reader = HwpReader::from_container(container).unwrap();
    let tree = reader.doc_info().unwrap();

    assert_eq!(tree.len(), 1);
    let list = tree[NodeId(0)].payload.as_list_header().unwrap();
    assert_eq!(list.item_count(), 3);
    assert_eq!(list.vertical_align, VerticalAlign::Center);
    assert_eq!(list.vertical_align.to_string(), "CENTER");
}

#[test]
fn reads_sections_in_numeric_order() {
    let container = plain_document(&[
        (10, paragraph(0, "ten")),
        (2, paragraph(0, "two")),
        (0, paragraph(0, "zero")),
    ]);
    let reader = HwpReader::from_container(container).unwrap();

    assert_eq!(reader.section_names().unwrap(), vec!["Section0", "Section2", "Section10"]);

    let document = reader.read_document().unwrap();
    let names: Vec<&str> = document.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Section0", "Section2", "Section10"]);
    assert!(document.failed_sections.is_empty());

    let text = document.sections[2].tree[NodeId(1)].payload.as_para_text().unwrap();
    assert_eq!(text.text, "ten");
}

#[test]
fn paragraph_nesting_under_table_cells() {
    let mut section = paragraph(0, "before");
    section.extend(record(HwpTag::CtrlHeader.raw(), 1, &u32::from_be_bytes(*b"tbl ").to_le_bytes()));
    section.extend(record(HwpTag::ListHeader.raw(), 2, &list_header(2, 1)));
    section.extend(paragraph(2, "cell one"));
    section.extend(paragraph(2, "cell two"));
    section.extend(paragraph(0, "after"));

    let reader = HwpReader::from_container(plain_document(&[(0, section)])).unwrap();
    let section = reader.read_section(&StreamRole::BodySection(0)).unwrap();
    let tree = &section.tree;

    assert_eq!(tree.roots().len(), 2);
    let ctrl = tree.find_by_tag(HwpTag::CtrlHeader.raw())[0];
    assert_eq!(tree[ctrl].parent, Some(tree.roots()[0]));
    match &tree[ctrl].payload {
        Payload::CtrlHeader(header) => assert_eq!(header.ctrl_id_str(), "tbl "),
        other => panic!("unexpected payload: {other:?}"),
    }

    let list = tree.find_by_tag(HwpTag::ListHeader.raw())[0];
    assert_eq!(tree[list].payload.as_list_header().unwrap().vertical_align, VerticalAlign::Bottom);
    let cells = tree.list_paragraphs(list);
    assert_eq!(cells.len(), 2);
    let cell_text = tree.children(cells[1])[0];
    assert_eq!(tree[cell_text].payload.as_para_text().unwrap().text, "cell two");

    let order: Vec<NodeId> = tree.preorder().map(|(id, _)| id).collect();
    assert_eq!(order, (0..tree.len()).map(NodeId).collect::<Vec<_>>());
}

#[test]
fn unknown_tags_are_kept_opaque() {
    let mut section = paragraph(0, "x");
    section.extend(record(OPAQUE_TAG, 1, &[0xDE, 0xAD]));
    let reader = HwpReader::from_container(plain_document(&[(0, section)])).unwrap();
    let tree = reader.read_section(&StreamRole::BodySection(0)).unwrap().tree;

    let opaque = tree.find_by_tag(OPAQUE_TAG)[0];
    assert_eq!(tree[opaque].payload, Payload::Opaque { tag: OPAQUE_TAG, bytes: vec![0xDE, 0xAD] });
}

#[test]
fn section_iterator_pulls_each_section() {
    let container = plain_document(&[(0, paragraph(0, "a")), (1, paragraph(0, "b"))]);
    let reader = HwpReader::from_container(container).unwrap();

    let sections = reader.iter_sections().unwrap();
    assert_eq!(sections.len(), 2);
    let names: Vec<String> = sections.map(|s| s.unwrap().name).collect();
    assert_eq!(names, vec!["Section0", "Section1"]);
}

#[test]
fn password_protected_documents_are_rejected() {
    let container = MemoryContainer::new().with_stream("/FileHeader", header(FileProperties::PASSWORD | FileProperties::COMPRESSED));
    let err = HwpReader::from_container(container).err().unwrap();
    assert!(matches!(err, HwpError::UnsupportedFormat(_)));
}

#[test]
fn missing_file_header_names_the_stream() {
    let err = HwpReader::from_container(MemoryContainer::new()).err().unwrap();
    assert_eq!(err.stream(), Some("/FileHeader"));
    assert!(matches!(err.root(), HwpError::Container { .. }));
}

#[test]
fn bin_data_is_inflated_with_the_document() {
    let image = b"\x89PNG fake image bytes".to_vec();
    let container = MemoryContainer::new()
        .with_stream("/FileHeader", header(FileProperties::COMPRESSED))
        .with_stream("/DocInfo", deflate(&doc_info(1)))
        .with_stream("/BodyText/Section0", deflate(&paragraph(0, "p")))
        .with_stream("/BinData/BIN0001.png", deflate(&image));
    let reader = HwpReader::from_container(container).unwrap();

    assert_eq!(reader.bin_data_names().unwrap(), vec!["BIN0001.png"]);
    assert_eq!(reader.read_bin_data("BIN0001.png").unwrap(), image);
}

#[test]
fn documents_without_bin_data_list_nothing() {
    let reader = HwpReader::from_container(plain_document(&[(0, paragraph(0, "p"))])).unwrap();
    assert!(reader.bin_data_names().unwrap().is_empty());
}

#[test]
fn walk_entries_is_depth_first() {
    let container = plain_document(&[(0, paragraph(0, "p"))]).with_stream("/BinData/BIN0001.bmp", vec![0]);
    let reader = HwpReader::from_container(container).unwrap();

    let paths: Vec<String> = reader.walk_entries().unwrap().into_iter().map(|e| e.path).collect();
    assert_eq!(
        paths,
        vec!["/BinData", "/BinData/BIN0001.bmp", "/BodyText", "/BodyText/Section0", "/DocInfo", "/FileHeader"]
    );
}

#[test]
fn sequential_and_parallel_decoding_agree() {
    let sections: Vec<(usize, Vec<u8>)> = (0..6).map(|i| (i, paragraph(0, &format!("section {i}")))).collect();

    let parallel = HwpReader::from_container(plain_document(&sections)).unwrap().read_document().unwrap();
    let sequential = HwpReader::from_container(plain_document(&sections))
        .unwrap()
        .with_options(ReaderOptions { parallel_sections: false, ..ReaderOptions::default() })
        .read_document()
        .unwrap();

    assert_eq!(parallel.sections.len(), 6);
    for (a, b) in parallel.sections.iter().zip(&sequential.sections) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.tree, b.tree);
    }
}

#[test]
fn many_sections_decode_on_a_bounded_pool() {
    const SECTION_COUNT: usize = 512;
    let mut sections: Vec<(usize, Vec<u8>)> =
        (0..SECTION_COUNT).map(|i| (i, paragraph(0, &format!("section {i}")))).collect();
    // One broken section in the middle must stay in its slot.
    sections[300].1.truncate(3);

    let parallel = HwpReader::from_container(plain_document(&sections)).unwrap().read_document().unwrap();
    let sequential = HwpReader::from_container(plain_document(&sections))
        .unwrap()
        .with_options(ReaderOptions { parallel_sections: false, ..ReaderOptions::default() })
        .read_document()
        .unwrap();

    assert_eq!(parallel.sections.len(), SECTION_COUNT - 1);
    assert_eq!(parallel.sections.len(), sequential.sections.len());
    for (a, b) in parallel.sections.iter().zip(&sequential.sections) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.tree, b.tree);
    }
    let indices: Vec<usize> = parallel.sections.iter().map(|s| s.index).collect();
    assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));

    assert_eq!(parallel.failed_sections.len(), 1);
    assert_eq!(parallel.failed_sections[0].index, 300);
    assert_eq!(sequential.failed_sections[0].index, 300);

    let text = parallel.sections[SECTION_COUNT - 2].tree[NodeId(1)].payload.as_para_text().unwrap();
    assert_eq!(text.text, format!("section {}", SECTION_COUNT - 1));
}
