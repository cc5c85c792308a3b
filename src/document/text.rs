use std::fs;
use std::path::Path;

use super::{DocumentReadError, DocumentReader, ensure_path};

/// Reads UTF-8 text documents (the markdown report) as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDocumentReader;

impl DocumentReader for TextDocumentReader {
    fn read_text(&self, path: &Path) -> Result<String, DocumentReadError> {
        ensure_path(path)?;

        let text = fs::read_to_string(path).map_err(|source| DocumentReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "Read text document");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current_report.md");
        fs::write(&path, "# Report\n\n- item\n").unwrap();

        let text = TextDocumentReader.read_text(&path).unwrap();
        assert_eq!(text, "# Report\n\n- item\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TextDocumentReader.read_text(&dir.path().join("absent.md"));
        assert!(matches!(result, Err(DocumentReadError::Io { .. })));
    }

    #[test]
    fn test_empty_path() {
        let result = TextDocumentReader.read_text(Path::new(""));
        assert!(matches!(result, Err(DocumentReadError::MissingPath)));
    }
}
