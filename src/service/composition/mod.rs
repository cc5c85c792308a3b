//! Report composition service using LLM
//!
//! Merges validated evidence into an existing narrative report. The generated
//! text is returned as the new report body without any validation.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::document::{DocumentReadError, DocumentReader, DocumentWriteError, write_document};
use crate::model::ExtractionResponse;
use crate::service::llm::{GenerationError, TextGenerator};
use crate::service::prompts::TemplateError;

mod prompts;

use prompts::build_composition_prompt;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompositionError {
    #[error("Document read error: {0}")]
    DocumentRead(#[from] DocumentReadError),

    #[error("Document write error: {0}")]
    DocumentWrite(#[from] DocumentWriteError),

    #[error("LLM composition failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Composition template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Failed to serialize evidence: {0}")]
    Serialization(String),
}

/// Composition role: read the current report, merge evidence, save the result
#[async_trait]
pub trait Composer: Send + Sync {
    fn read_document(&self, path: &Path) -> Result<String, CompositionError>;

    async fn compose_updated_document(
        &self,
        original_text: &str,
        evidence: &ExtractionResponse,
    ) -> Result<String, CompositionError>;

    fn save_document(&self, content: &str, path: &Path) -> Result<(), CompositionError>;
}

/// Composer backed by a text generator
pub struct LlmComposer {
    generator: Arc<dyn TextGenerator>,
    reader: Arc<dyn DocumentReader>,
    prompt_template: String,
}

impl LlmComposer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        reader: Arc<dyn DocumentReader>,
        prompt_template: String,
    ) -> Self {
        tracing::info!(
            model = %generator.model(),
            template_length = prompt_template.len(),
            "Report composition service initialized"
        );
        Self {
            generator,
            reader,
            prompt_template,
        }
    }
}

#[async_trait]
impl Composer for LlmComposer {
    fn read_document(&self, path: &Path) -> Result<String, CompositionError> {
        Ok(self.reader.read_text(path)?)
    }

    async fn compose_updated_document(
        &self,
        original_text: &str,
        evidence: &ExtractionResponse,
    ) -> Result<String, CompositionError> {
        let new_info = serde_json::to_string_pretty(evidence)
            .map_err(|e| CompositionError::Serialization(e.to_string()))?;
        let prompt = build_composition_prompt(&self.prompt_template, original_text, &new_info)?;
        let prompt_length = prompt.len();
        let model = self.generator.model();

        tracing::debug!(
            model = %model,
            prompt_length = prompt_length,
            evidence_items = evidence.evidence_items.len(),
            "Initiating LLM call for report composition"
        );

        let start_time = std::time::Instant::now();

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                tracing::info!(
                    model = %model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    document_length = text.len(),
                    "LLM call for report composition completed successfully"
                );
                Ok(text)
            }
            Err(e) => {
                tracing::error!(
                    model = %model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    error = %e,
                    "LLM call for report composition failed"
                );
                Err(e.into())
            }
        }
    }

    fn save_document(&self, content: &str, path: &Path) -> Result<(), CompositionError> {
        Ok(write_document(path, content)?)
    }
}
