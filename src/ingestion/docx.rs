//! Raw-text extraction from DOCX archives.
//!
//! Only `word/document.xml` is read. Run text (`w:t`) is kept, tabs and breaks become `\t` and
//! `\n`, and every paragraph is followed by a blank line. Deleted text, field codes, and styling
//! are dropped.

use roxmltree::{Document, Node};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const MAIN_PART: &str = "word/document.xml";

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| format!("failed to open DOCX archive: {error}"))?;
    let mut xml = String::new();
    archive
        .by_name(MAIN_PART)
        .map_err(|error| format!("DOCX archive has no {MAIN_PART}: {error}"))?
        .read_to_string(&mut xml)
        .map_err(|error| format!("failed to read {MAIN_PART}: {error}"))?;

    let document =
        Document::parse(&xml).map_err(|error| format!("malformed {MAIN_PART}: {error}"))?;

    let mut text = String::new();
    collect_text(document.root(), &mut text);
    Ok(text.trim().to_string())
}

fn collect_text(node: Node<'_, '_>, out: &mut String) {
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() != Some(WORDPROCESSING_NS) {
            collect_text(child, out);
            continue;
        }
        match child.tag_name().name() {
            "t" => out.push_str(child.text().unwrap_or_default()),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            "p" => {
                collect_text(child, out);
                out.push_str("\n\n");
            }
            _ => collect_text(child, out),
        }
    }
}
