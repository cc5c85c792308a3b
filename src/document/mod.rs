//! Document readers for the source reports and the narrative report

mod pdf;
mod text;

use std::fs;
use std::path::{Path, PathBuf};

pub use pdf::PdfDocumentReader;
pub use text::TextDocumentReader;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DocumentReadError {
    #[error("No document path given")]
    MissingPath,

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract PDF text from {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DocumentWriteError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for turning a document on local storage into plain text
pub trait DocumentReader: Send + Sync {
    fn read_text(&self, path: &Path) -> Result<String, DocumentReadError>;
}

/// Write `content` to `path`, replacing any existing file
pub fn write_document(path: &Path, content: &str) -> Result<(), DocumentWriteError> {
    fs::write(path, content).map_err(|source| DocumentWriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), bytes = content.len(), "Document saved");
    Ok(())
}

fn ensure_path(path: &Path) -> Result<(), DocumentReadError> {
    if path.as_os_str().is_empty() {
        return Err(DocumentReadError::MissingPath);
    }
    Ok(())
}
