//! Error types for evidence extraction

use thiserror::Error;

use crate::document::DocumentReadError;
use crate::service::extraction::validation::SchemaValidationError;
use crate::service::llm::GenerationError;

/// Error type for evidence extraction
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("Document read error: {0}")]
    DocumentRead(#[from] DocumentReadError),

    #[error("LLM extraction failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid JSON response: {0}")]
    MalformedResponse(String),

    #[error("Schema validation error: {0}")]
    SchemaValidation(#[from] SchemaValidationError),
}
