//! Extension-dispatched text extraction
//!
//! Files are opaque byte sources; the extension picks the extraction
//! strategy. PDF is extracted page-by-page so each page keeps its number in
//! metadata, DOCX pulls the `w:t` text runs out of the OOXML archive, and
//! `.txt`/`.md` are read whole. Anything else is an error the processor
//! logs and skips.

use std::io::Read;
use std::path::Path;

use crate::documents::types::{Document, DocumentMetadata};
use crate::errors::{DocChatError, Result};

/// Decompression ceiling for a single OOXML archive entry
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extensions this module can extract
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "docx"];

/// Check whether a path has a supported extension
pub fn is_supported(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Extract text from raw file bytes into one or more documents
///
/// `source` is recorded as provenance metadata on every produced document.
/// Paginated formats yield one document per non-empty page; flat formats
/// yield a single document.
pub fn extract(source: &str, bytes: &[u8], path: &Path) -> Result<Vec<Document>> {
    let ext = extension_of(path)
        .ok_or_else(|| DocChatError::UnsupportedFileType(source.to_string()))?;

    match ext.as_str() {
        "pdf" => extract_pdf(source, bytes),
        "txt" | "md" => extract_plain(source, bytes),
        "docx" => extract_docx(source, bytes),
        _ => Err(DocChatError::UnsupportedFileType(source.to_string())),
    }
}

fn extract_pdf(source: &str, bytes: &[u8]) -> Result<Vec<Document>> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        DocChatError::Ingestion {
            file: source.to_string(),
            reason: format!("PDF extraction failed: {}", e),
        }
    })?;

    let documents = pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(idx, text)| {
            Document::new(
                text,
                DocumentMetadata {
                    source: source.to_string(),
                    page: Some(idx as u32 + 1),
                    embedding: None,
                },
            )
        })
        .collect();

    Ok(documents)
}

fn extract_plain(source: &str, bytes: &[u8]) -> Result<Vec<Document>> {
    let text = String::from_utf8_lossy(bytes).into_owned();
    Ok(vec![Document::new(
        text,
        DocumentMetadata {
            source: source.to_string(),
            page: None,
            embedding: None,
        },
    )])
}

fn extract_docx(source: &str, bytes: &[u8]) -> Result<Vec<Document>> {
    let ooxml_err = |reason: String| DocChatError::Ingestion {
        file: source.to_string(),
        reason,
    };

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ooxml_err(format!("not a valid OOXML archive: {}", e)))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| ooxml_err("word/document.xml not found".to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| ooxml_err(e.to_string()))?;
    }
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ooxml_err("word/document.xml exceeds size limit".to_string()));
    }

    let text = extract_text_runs(&doc_xml).map_err(|e| ooxml_err(e))?;
    Ok(vec![Document::new(
        text,
        DocumentMetadata {
            source: source.to_string(),
            page: None,
            embedding: None,
        },
    )])
}

/// Collect `w:t` text runs from a DOCX document body, joining paragraphs
/// with newlines
fn extract_text_runs(xml: &[u8]) -> std::result::Result<String, String> {
    use quick_xml::events::Event;

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"t" {
                    in_text_run = true;
                } else if name.as_ref() == b"p" && !out.is_empty() {
                    out.push('\n');
                }
            }
            Ok(Event::Text(te)) => {
                if in_text_run {
                    out.push_str(te.unescape().unwrap_or_default().as_ref());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
