//! Evaluation pipeline driver
//!
//! `run_evaluation` extracts and reports evidence from one source document.
//! Composition is a separate step (`compose_report`) and is never chained
//! automatically after extraction.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::model::ExtractionResponse;
use crate::service::composition::{Composer, CompositionError};
use crate::service::extraction::{ExtractionError, Extractor};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Composition failed: {0}")]
    Composition(#[from] CompositionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
}

/// Status record of an evaluation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationStatus {
    pub status: RunStatus,
}

/// Status record of a composition run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionStatus {
    pub status: RunStatus,
    pub output_path: PathBuf,
}

/// Sequences the extraction and composition roles for one process run
pub struct EvaluationPipeline {
    extractor: Box<dyn Extractor>,
    composer: Box<dyn Composer>,
    existing_doc_path: PathBuf,
    output_path: PathBuf,
}

impl EvaluationPipeline {
    pub fn new(
        extractor: Box<dyn Extractor>,
        composer: Box<dyn Composer>,
        existing_doc_path: PathBuf,
        output_path: PathBuf,
    ) -> Self {
        Self {
            extractor,
            composer,
            existing_doc_path,
            output_path,
        }
    }

    /// Extract evidence from `document_path` and log every accepted item
    pub async fn run_evaluation(
        &self,
        document_path: &Path,
    ) -> Result<(EvaluationStatus, ExtractionResponse), PipelineError> {
        tracing::info!(document = %document_path.display(), "Starting evaluation run");

        let document_text = self.extractor.read_document(document_path)?;
        let extraction = self.extractor.extract_information(&document_text).await?;

        for (index, evidence) in extraction.evidence_items.iter().enumerate() {
            tracing::info!(
                index = index,
                category = %evidence.category,
                llm_family = %evidence.llm_family,
                capability = %evidence.capability,
                metric_type = %evidence.metric.metric_type,
                metric_value = %evidence.metric.value,
                score = %evidence.performance.score,
                section = %evidence.source_info.section,
                page = ?evidence.source_info.page,
                confidence = %evidence.source_info.confidence,
                "Evidence item"
            );
        }

        let status = EvaluationStatus {
            status: RunStatus::Success,
        };
        Ok((status, extraction))
    }

    /// Merge `evidence` into the existing report and overwrite the output report
    pub async fn compose_report(
        &self,
        evidence: &ExtractionResponse,
    ) -> Result<CompositionStatus, PipelineError> {
        tracing::info!(
            existing = %self.existing_doc_path.display(),
            output = %self.output_path.display(),
            "Starting report composition"
        );

        let original = self.composer.read_document(&self.existing_doc_path)?;
        let updated = self
            .composer
            .compose_updated_document(&original, evidence)
            .await?;
        self.composer.save_document(&updated, &self.output_path)?;

        Ok(CompositionStatus {
            status: RunStatus::Success,
            output_path: self.output_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PdfDocumentReader, TextDocumentReader};
    use crate::service::composition::LlmComposer;
    use crate::service::extraction::LlmExtractor;
    use crate::service::llm::testing::StubGenerator;
    use std::fs;
    use std::sync::Arc;

    const ONE_ITEM_RESPONSE: &str = r#"{
        "evidence_items": [{
            "category": "ATTACK_TOOL_DEVELOPMENT",
            "llm_family": "GEMINI",
            "capability": "Exploit proof-of-concept writing",
            "metric": {"type": "QUANTITATIVE", "value": "3/10", "unit": "tasks"},
            "performance": {"score": 0.3},
            "context": {"test_conditions": "Sandboxed", "limitations": ["Few tasks"], "assumptions": []},
            "source_info": {"section": "Cyber", "page": 4, "confidence": "LOW"}
        }],
        "metadata": {
            "total_evidence_points": 1,
            "coverage_gaps": [],
            "confidence_summary": {"overall_score": "LOW", "methodology_strength": "MEDIUM", "data_quality": "MEDIUM"}
        }
    }"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        source: PathBuf,
        existing: PathBuf,
        output: PathBuf,
        extraction_generator: Arc<StubGenerator>,
        composition_generator: Arc<StubGenerator>,
        pipeline: EvaluationPipeline,
    }

    fn fixture(extraction_response: &str, composed: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("eval.txt");
        let existing = dir.path().join("current_report.md");
        let output = dir.path().join("updated_report.md");
        fs::write(&source, "Evaluation report body").unwrap();
        fs::write(&existing, "# Report\n").unwrap();

        let extraction_generator = Arc::new(StubGenerator::returning(extraction_response));
        let composition_generator = Arc::new(StubGenerator::returning(composed));

        let extractor = LlmExtractor::new(
            extraction_generator.clone(),
            Arc::new(TextDocumentReader),
            "Extract.".to_string(),
        );
        let composer = LlmComposer::new(
            composition_generator.clone(),
            Arc::new(TextDocumentReader),
            "{original_md}\n{new_info}".to_string(),
        );
        let pipeline = EvaluationPipeline::new(
            Box::new(extractor),
            Box::new(composer),
            existing.clone(),
            output.clone(),
        );

        Fixture {
            _dir: dir,
            source,
            existing,
            output,
            extraction_generator,
            composition_generator,
            pipeline,
        }
    }

    #[tokio::test]
    async fn test_run_evaluation_does_not_compose() {
        let f = fixture(ONE_ITEM_RESPONSE, "# Report v2\n");

        let (status, extraction) = f.pipeline.run_evaluation(&f.source).await.unwrap();

        assert_eq!(status.status, RunStatus::Success);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"status": "success"})
        );
        assert_eq!(extraction.evidence_items.len(), 1);
        assert!(f.extraction_generator.prompts()[0].ends_with("Extract.\nEvaluation report body"));
        assert!(f.composition_generator.prompts().is_empty());
        assert!(!f.output.exists());
    }

    #[tokio::test]
    async fn test_compose_report_overwrites_output() {
        let f = fixture(ONE_ITEM_RESPONSE, "# Report v2\n");
        fs::write(&f.output, "old output").unwrap();

        let (_, extraction) = f.pipeline.run_evaluation(&f.source).await.unwrap();
        let status = f.pipeline.compose_report(&extraction).await.unwrap();

        assert_eq!(status.output_path, f.output);
        assert_eq!(fs::read_to_string(&f.output).unwrap(), "# Report v2\n");
        assert_eq!(fs::read_to_string(&f.existing).unwrap(), "# Report\n");
        let prompt = &f.composition_generator.prompts()[0];
        assert!(prompt.contains("# Report\n"));
        assert!(prompt.contains("\"capability\": \"Exploit proof-of-concept writing\""));
    }

    #[tokio::test]
    async fn test_unreadable_document_aborts_before_generation() {
        let f = fixture(ONE_ITEM_RESPONSE, "");

        let err = f
            .pipeline
            .run_evaluation(&f.source.with_file_name("missing.txt"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::DocumentRead(_))
        ));
        assert!(f.extraction_generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_schema_failure_aborts_run() {
        let f = fixture(&ONE_ITEM_RESPONSE.replace("GEMINI", "LLAMA"), "");

        let err = f.pipeline.run_evaluation(&f.source).await.unwrap_err();
        assert!(err.to_string().contains("evidence_items[0].llm_family"));
    }

    #[tokio::test]
    async fn test_pdf_reader_rejects_non_pdf_source() {
        let f = fixture(ONE_ITEM_RESPONSE, "");
        let extractor = LlmExtractor::new(
            f.extraction_generator.clone(),
            Arc::new(PdfDocumentReader),
            "Extract.".to_string(),
        );

        let err = extractor.read_document(&f.source).unwrap_err();
        assert!(matches!(err, ExtractionError::DocumentRead(_)));
    }
}
