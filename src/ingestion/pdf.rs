//! PDF text-layer extraction backed by `lopdf`.

use lopdf::Document;

/// Extract the text layer page by page.
///
/// Each page's text items are collapsed onto one line separated by single spaces; pages are
/// separated by newlines and the result is trimmed.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let document =
        Document::load_mem(bytes).map_err(|error| format!("failed to parse PDF: {error}"))?;

    let mut full_text = String::new();
    for page_number in document.get_pages().keys() {
        let raw = document
            .extract_text(&[*page_number])
            .map_err(|error| format!("failed to read text on page {page_number}: {error}"))?;
        let page_text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        tracing::trace!(page = page_number, chars = page_text.len(), "Extracted PDF page");
        full_text.push_str(&page_text);
        full_text.push('\n');
    }

    Ok(full_text.trim().to_string())
}
