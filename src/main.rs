use hwp_reader::hwp::tags::HwpTag;
use hwp_reader::{HwpReader, Payload, SectionTree};
use std::env;

const PREVIEW_BYTES: usize = 16;
const PREVIEW_CHARS: usize = 60;

fn describe(payload: &Payload) -> String {
    match payload {
        Payload::ListHeader(list) => format!("paragraphs={} valign={}", list.paragraph_count, list.vertical_align),
        Payload::DocumentProperties(props) => format!("sections={}", props.section_count),
        Payload::ParaHeader(para) => format!("chars={} shape={}", para.char_count, para.para_shape_id),
        Payload::ParaText(text) => {
            let preview: String = text.text.chars().take(PREVIEW_CHARS).collect();
            format!("{:?} controls={:?}", preview, text.controls)
        }
        Payload::CtrlHeader(ctrl) => format!("ctrl='{}'", ctrl.ctrl_id_str()),
        Payload::Opaque { bytes, .. } => {
            let shown = &bytes[..bytes.len().min(PREVIEW_BYTES)];
            let ellipsis = if bytes.len() > PREVIEW_BYTES { "..." } else { "" };
            format!("{}{}", hex::encode(shown), ellipsis)
        }
    }
}

fn print_records(tree: &SectionTree) {
    for (_, node) in tree.preorder() {
        let name = HwpTag::from_raw(node.tag())
            .map(|tag| format!("{:?}", tag))
            .unwrap_or_else(|| format!("Tag{}", node.tag()));
        println!(
            "    {}{} [{} bytes @{}] {}",
            "  ".repeat(node.level() as usize),
            name,
            node.header.size,
            node.offset,
            describe(&node.payload)
        );
    }
}

fn section_text(tree: &SectionTree) -> String {
    tree.nodes()
        .filter_map(|(_, node)| node.payload.as_para_text())
        .map(|text| text.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-hwp-file> [--list] [--records]", args[0]);
        std::process::exit(1);
    }

    let hwp_path = &args[1];
    let list_entries = args.iter().any(|arg| arg == "--list");
    let show_records = args.iter().any(|arg| arg == "--records");

    println!("Reading HWP file: {}", hwp_path);
    println!("{}", "=".repeat(60));

    let reader = match HwpReader::open(hwp_path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to open HWP file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let header = reader.header();
    println!("\nDocument Information:");
    println!("  Version: {}", header.version);
    println!("  Compressed: {}", header.is_compressed());
    println!("  Distributable: {}", header.is_distributable());
    println!("  Properties: {:?}", header.properties);

    if list_entries {
        println!("\nContainer Entries:");
        match reader.walk_entries() {
            Ok(entries) => {
                for entry in entries {
                    let kind = if entry.is_storage { "storage" } else { "stream" };
                    println!("  {} ({})", entry.path, kind);
                }
            }
            Err(e) => eprintln!("  ERROR: {}", e),
        }
    }

    let document = match reader.read_document() {
        Ok(document) => document,
        Err(e) => {
            eprintln!("\nERROR: Failed to decode document");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("\nDocInfo: {} records", document.doc_info.len());
    if show_records {
        print_records(&document.doc_info);
    }

    println!("\nSections:");
    for section in &document.sections {
        let paragraphs = section.tree.find_by_tag(HwpTag::ParaHeader.raw()).len();
        println!(
            "  {}: {} records, {} paragraphs",
            section.name,
            section.tree.len(),
            paragraphs
        );
        if show_records {
            print_records(&section.tree);
        } else {
            let text = section_text(&section.tree);
            let preview: String = text.chars().take(PREVIEW_CHARS * 4).collect();
            if !preview.is_empty() {
                println!("    {}", preview.replace('\n', "\n    "));
            }
        }
    }

    for failure in &document.failed_sections {
        eprintln!("  {}: FAILED ({})", failure.name, failure.error);
    }

    match reader.bin_data_names() {
        Ok(names) if !names.is_empty() => println!("\nBinData: {}", names.join(", ")),
        Ok(_) => {}
        Err(e) => eprintln!("\nBinData: ERROR {}", e),
    }

    if !document.failed_sections.is_empty() {
        std::process::exit(2);
    }
}
