//! Document ingestion: file validation, buffering, and text extraction.
//!
//! A selection is validated on its metadata (declared MIME type and size) before any bytes are
//! read, so an oversized or unsupported file is rejected without touching its contents. Accepted
//! files are read into memory once and handed to the PDF or DOCX extractor.

mod docx;
mod pdf;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// MIME type reported for PDF files.
pub const PDF_MIME: &str = "application/pdf";
/// MIME type reported for Office Open XML word-processing files.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Largest accepted document, in bytes.
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;
/// Extracted text must be strictly longer than this many characters.
pub const MIN_EXTRACTED_CHARS: usize = 50;

/// Errors raised while validating or extracting a document.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The declared MIME type is neither PDF nor DOCX.
    #[error("Please select a PDF or DOCX file.")]
    UnsupportedType {
        /// MIME type reported for the selection.
        mime_type: String,
    },
    /// The file exceeds [`MAX_DOCUMENT_BYTES`].
    #[error("File size must be less than 10MB.")]
    TooLarge {
        /// Reported file size in bytes.
        size_bytes: u64,
    },
    /// The file could not be read into memory.
    #[error("Error processing file. Please try again.")]
    Unreadable {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The parser rejected the document.
    #[error("Error processing file. Please try again.")]
    ExtractionFailed {
        /// Parser diagnostic, kept for logs.
        reason: String,
    },
    /// Extraction succeeded but produced too little text to summarize.
    #[error("Could not extract text from document. Please try another file.")]
    EmptyContent {
        /// Character count of the extracted text.
        chars: usize,
    },
}

impl IngestError {
    /// Whether the failure happened before the document contents were examined.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnsupportedType { .. } | Self::TooLarge { .. })
    }
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
}

impl DocumentKind {
    /// Resolve a declared MIME type, ignoring parameters such as `; charset=`.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Guess the MIME type of a path from its extension.
///
/// Unknown extensions map to `application/octet-stream`, which ingestion rejects.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => PDF_MIME,
        Some("docx") => DOCX_MIME,
        _ => "application/octet-stream",
    }
}

/// Metadata reported for a selected file before its contents are read.
#[derive(Debug, Clone)]
pub struct FileSelection {
    /// Display name, usually the file name.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// A selected file whose contents are available in memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name, usually the file name.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Metadata view used for validation.
    pub fn selection(&self) -> FileSelection {
        FileSelection {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

/// A validated document together with its extracted text.
#[derive(Debug, Clone)]
pub struct Document {
    /// Display name of the source file.
    pub name: String,
    /// Size of the source file in bytes.
    pub size_bytes: u64,
    /// Detected format.
    pub kind: DocumentKind,
    /// Plain text extracted from the document; always longer than [`MIN_EXTRACTED_CHARS`].
    pub extracted_text: String,
}

/// Check type and size of a selection without reading it.
pub fn validate(selection: &FileSelection) -> Result<DocumentKind, IngestError> {
    let kind = DocumentKind::from_mime(&selection.mime_type).ok_or_else(|| {
        IngestError::UnsupportedType {
            mime_type: selection.mime_type.clone(),
        }
    })?;

    if selection.size_bytes > MAX_DOCUMENT_BYTES {
        return Err(IngestError::TooLarge {
            size_bytes: selection.size_bytes,
        });
    }

    Ok(kind)
}

/// Validate an in-memory file and extract its text.
pub fn ingest(file: SourceFile) -> Result<Document, IngestError> {
    let kind = validate(&file.selection())?;
    let size_bytes = file.bytes.len() as u64;
    tracing::debug!(name = %file.name, ?kind, size_bytes, "Extracting document text");

    let extracted_text = extract_text(kind, &file.bytes)?;
    let chars = extracted_text.chars().count();
    if chars <= MIN_EXTRACTED_CHARS {
        return Err(IngestError::EmptyContent { chars });
    }

    tracing::info!(name = %file.name, ?kind, size_bytes, chars, "Document text extracted");
    Ok(Document {
        name: file.name,
        size_bytes,
        kind,
        extracted_text,
    })
}

/// Validate a file on disk, read it into memory, and extract its text.
///
/// Type and size are checked from the extension and file metadata before the read.
pub async fn ingest_path(path: &Path) -> Result<Document, IngestError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| IngestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let selection = FileSelection {
        name,
        mime_type: mime_type_for_path(path).to_string(),
        size_bytes: metadata.len(),
    };
    validate(&selection)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| IngestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    ingest(SourceFile {
        name: selection.name,
        mime_type: selection.mime_type,
        bytes,
    })
}

fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, IngestError> {
    let result = match kind {
        DocumentKind::Pdf => pdf::extract_text(bytes),
        DocumentKind::Docx => docx::extract_text(bytes),
    };
    result.map_err(|reason| IngestError::ExtractionFailed { reason })
}

/// Render a byte count for display, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}


#[cfg(test)]
mod tests {
    use super::fixtures::{docx_with_paragraphs, pdf_with_pages};
    use super::*;

    fn source(name: &str, mime_type: &str, bytes: Vec<u8>) -> SourceFile {
        SourceFile {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    #[test]
    fn rejects_unsupported_mime_types() {
        for mime in ["text/plain", "application/msword", "image/png", ""] {
            let error = ingest(source("notes", mime, vec![b'a'; 100])).expect_err("unsupported");
            assert!(
                matches!(error, IngestError::UnsupportedType { .. }),
                "{mime} should be unsupported"
            );
            assert!(error.is_validation());
        }
    }

    #[test]
    fn rejects_files_over_ten_mebibytes() {
        let selection = FileSelection {
            name: "big.pdf".into(),
            mime_type: PDF_MIME.into(),
            size_bytes: MAX_DOCUMENT_BYTES + 1,
        };
        let error = validate(&selection).expect_err("too large");
        assert!(matches!(error, IngestError::TooLarge { size_bytes } if size_bytes == MAX_DOCUMENT_BYTES + 1));
    }

    #[test]
    fn accepts_exactly_ten_mebibytes() {
        let selection = FileSelection {
            name: "edge.docx".into(),
            mime_type: DOCX_MIME.into(),
            size_bytes: MAX_DOCUMENT_BYTES,
        };
        assert_eq!(validate(&selection).expect("within limit"), DocumentKind::Docx);
    }

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(
            DocumentKind::from_mime("Application/PDF; charset=binary"),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn short_pdf_is_rejected_as_empty_content() {
        let bytes = pdf_with_pages(&["Hello World"]);
        let error = ingest(source("hello.pdf", PDF_MIME, bytes)).expect_err("too short");
        assert!(matches!(error, IngestError::EmptyContent { chars: 11 }));
    }

    #[test]
    fn pdf_pages_are_joined_with_newlines() {
        let first = "The first page discusses quarterly revenue growth in detail";
        let second = "The second page covers the hiring plan for next year";
        let bytes = pdf_with_pages(&[first, second]);

        let document = ingest(source("report.pdf", PDF_MIME, bytes)).expect("ingest pdf");
        assert_eq!(document.kind, DocumentKind::Pdf);
        assert_eq!(document.extracted_text, format!("{first}\n{second}"));
    }

    #[test]
    fn docx_with_fifty_one_characters_is_accepted() {
        let text = "a".repeat(51);
        let bytes = docx_with_paragraphs(&[&text]);
        let document = ingest(source("letters.docx", DOCX_MIME, bytes)).expect("ingest docx");
        assert_eq!(document.kind, DocumentKind::Docx);
        assert_eq!(document.extracted_text.chars().count(), 51);
    }

    #[test]
    fn docx_with_fifty_characters_is_rejected() {
        let text = "a".repeat(50);
        let bytes = docx_with_paragraphs(&[&text]);
        let error = ingest(source("letters.docx", DOCX_MIME, bytes)).expect_err("too short");
        assert!(matches!(error, IngestError::EmptyContent { chars: 50 }));
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let error = ingest(source("broken.pdf", PDF_MIME, b"not a pdf at all".to_vec()))
            .expect_err("broken pdf");
        assert!(matches!(error, IngestError::ExtractionFailed { .. }));

        let error = ingest(source("broken.docx", DOCX_MIME, b"not a zip".to_vec()))
            .expect_err("broken docx");
        assert!(matches!(error, IngestError::ExtractionFailed { .. }));
        assert!(!error.is_validation());
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for_path(Path::new("a/B.PDF")), PDF_MIME);
        assert_eq!(mime_type_for_path(Path::new("memo.docx")), DOCX_MIME);
        assert_eq!(
            mime_type_for_path(Path::new("memo.doc")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn ingest_path_reads_documents_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("minutes.docx");
        let text = "Minutes of the meeting: the committee approved the new budget proposal.";
        std::fs::write(&path, docx_with_paragraphs(&[text])).expect("write fixture");

        let document = ingest_path(&path).await.expect("ingest from disk");
        assert_eq!(document.name, "minutes.docx");
        assert_eq!(document.extracted_text, text);
    }

    #[tokio::test]
    async fn ingest_path_reports_missing_files() {
        let error = ingest_path(Path::new("/definitely/not/here.pdf"))
            .await
            .expect_err("missing file");
        assert!(matches!(error, IngestError::Unreadable { .. }));
    }

    #[test]
    fn formats_file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }
}
