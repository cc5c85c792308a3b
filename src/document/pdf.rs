use std::fs;
use std::path::Path;

use super::{DocumentReadError, DocumentReader, ensure_path};

/// PDF text reader using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; pages are joined with a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDocumentReader;

impl DocumentReader for PdfDocumentReader {
    fn read_text(&self, path: &Path) -> Result<String, DocumentReadError> {
        ensure_path(path)?;

        let bytes = fs::read(path).map_err(|source| DocumentReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            DocumentReadError::Pdf {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let text = pages.join(" ");

        tracing::info!(
            path = %path.display(),
            pages = pages.len(),
            text_length = text.len(),
            "Extracted PDF text"
        );

        Ok(text)
    }
}
