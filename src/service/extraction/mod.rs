//! Evidence extraction service using LLM
//!
//! Turns the text of an evaluation report into a validated [`ExtractionResponse`].

use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

use crate::document::DocumentReader;
use crate::model::ExtractionResponse;
use crate::service::llm::TextGenerator;

pub mod error;
pub mod prompts;
pub mod response;
pub mod validation;

pub use error::ExtractionError;
pub use validation::SchemaValidationError;

use prompts::build_extraction_prompt;
use response::{backfill_extraction_timestamp, parse_response};
use validation::validate_extraction_response;

/// Extraction role: read a source document and extract evidence from its text
#[async_trait]
pub trait Extractor: Send + Sync {
    fn read_document(&self, path: &Path) -> Result<String, ExtractionError>;

    async fn extract_information(
        &self,
        document_text: &str,
    ) -> Result<ExtractionResponse, ExtractionError>;
}

/// Extractor backed by a text generator
pub struct LlmExtractor {
    generator: Arc<dyn TextGenerator>,
    reader: Arc<dyn DocumentReader>,
    prompt_template: String,
}

impl LlmExtractor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        reader: Arc<dyn DocumentReader>,
        prompt_template: String,
    ) -> Self {
        tracing::info!(
            model = %generator.model(),
            template_length = prompt_template.len(),
            "Evidence extraction service initialized"
        );
        Self {
            generator,
            reader,
            prompt_template,
        }
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    fn read_document(&self, path: &Path) -> Result<String, ExtractionError> {
        Ok(self.reader.read_text(path)?)
    }

    async fn extract_information(
        &self,
        document_text: &str,
    ) -> Result<ExtractionResponse, ExtractionError> {
        let prompt = build_extraction_prompt(&self.prompt_template, document_text);
        let prompt_length = prompt.len();
        let model = self.generator.model();

        tracing::debug!(
            model = %model,
            prompt_length = prompt_length,
            document_length = document_text.len(),
            "Initiating LLM call for evidence extraction"
        );

        let start_time = std::time::Instant::now();

        let text = match self.generator.generate(&prompt).await {
            Ok(text) => {
                tracing::info!(
                    model = %model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    response_length = text.len(),
                    "LLM call for evidence extraction completed successfully"
                );
                text
            }
            Err(e) => {
                tracing::error!(
                    model = %model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt_length,
                    error = %e,
                    "LLM call for evidence extraction failed"
                );
                return Err(e.into());
            }
        };

        let mut raw = parse_response(&text).inspect_err(|e| {
            tracing::error!(error = %e, "Extraction response is not valid JSON");
        })?;

        if backfill_extraction_timestamp(&mut raw, Utc::now()) {
            tracing::debug!("Extraction timestamp missing, filled with current time");
        }

        let extracted = validate_extraction_response(&raw).map_err(|e| {
            tracing::error!(
                violations = ?e.violations,
                "Extraction response failed schema validation"
            );
            ExtractionError::from(e)
        })?;

        tracing::info!(
            evidence_items = extracted.evidence_items.len(),
            total_evidence_points = extracted.metadata.total_evidence_points,
            coverage_gaps = extracted.metadata.coverage_gaps.len(),
            "Evidence extraction complete"
        );

        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocumentReader;
    use crate::model::{EvidenceCategory, Score};
    use crate::service::extraction::validation::is_iso8601;
    use crate::service::llm::testing::StubGenerator;
    use crate::service::prompts::ACADEMIC_RESEARCH_PREAMBLE;

    const EMPTY_RESPONSE: &str = r#"{"evidence_items": [], "metadata": {"total_evidence_points": 0, "coverage_gaps": [], "confidence_summary": {"overall_score": "LOW", "methodology_strength": "LOW", "data_quality": "LOW"}}}"#;

    const SINGLE_ITEM_RESPONSE: &str = r#"{
        "evidence_items": [{
            "category": "SOCIAL_MANIPULATION",
            "llm_family": "CLAUDE",
            "capability": "Persuasive phishing email drafting",
            "metric": {"type": "QUALITATIVE", "value": "comparable to human red-teamers"},
            "performance": {"score": "moderate", "comparison": "previous model weaker"},
            "context": {"test_conditions": "Simulated inbox", "limitations": [], "assumptions": ["English only"]},
            "source_info": {"section": "Persuasion", "confidence": "MEDIUM"}
        }],
        "metadata": {
            "total_evidence_points": 1,
            "coverage_gaps": [],
            "confidence_summary": {"overall_score": "MEDIUM", "methodology_strength": "MEDIUM", "data_quality": "HIGH"},
            "extraction_timestamp": "2025-02-10T09:30:00Z"
        }
    }"#;

    fn extractor_returning(generator: Arc<StubGenerator>) -> LlmExtractor {
        LlmExtractor::new(
            generator,
            Arc::new(TextDocumentReader),
            "Extract capability evidence as JSON.".to_string(),
        )
    }

    #[tokio::test]
    async fn test_empty_evidence_gets_timestamp() {
        let generator = Arc::new(StubGenerator::returning(EMPTY_RESPONSE));
        let extractor = extractor_returning(generator);

        let extracted = extractor.extract_information("report text").await.unwrap();

        assert!(extracted.evidence_items.is_empty());
        assert!(is_iso8601(&extracted.metadata.extraction_timestamp));
        let timestamp = &extracted.metadata.extraction_timestamp;
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_existing_timestamp_is_kept() {
        let generator = Arc::new(StubGenerator::returning(SINGLE_ITEM_RESPONSE));
        let extractor = extractor_returning(generator);

        let extracted = extractor.extract_information("report text").await.unwrap();

        assert_eq!(extracted.metadata.extraction_timestamp, "2025-02-10T09:30:00Z");
        let item = &extracted.evidence_items[0];
        assert_eq!(item.category, EvidenceCategory::SocialManipulation);
        assert_eq!(item.performance.score, Score::Text("moderate".to_string()));
        assert_eq!(item.source_info.page, None);
    }

    #[tokio::test]
    async fn test_prompt_layout() {
        let generator = Arc::new(StubGenerator::returning(EMPTY_RESPONSE));
        let extractor = extractor_returning(Arc::clone(&generator));

        extractor.extract_information("REPORT BODY").await.unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            format!("{ACADEMIC_RESEARCH_PREAMBLE}\nExtract capability evidence as JSON.\nREPORT BODY")
        );
    }

    #[tokio::test]
    async fn test_not_json_is_malformed_response() {
        let generator = Arc::new(StubGenerator::returning("not json"));
        let extractor = extractor_returning(Arc::clone(&generator));

        let err = extractor.extract_information("report text").await.unwrap_err();

        match &err {
            ExtractionError::MalformedResponse(detail) => {
                assert!(detail.contains("expected"), "parser complaint missing: {detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Invalid JSON response"));
        assert_eq!(generator.prompts().len(), 1, "generation must not be retried");
    }

    #[tokio::test]
    async fn test_unknown_category_is_schema_error() {
        let response = SINGLE_ITEM_RESPONSE.replace("SOCIAL_MANIPULATION", "UNKNOWN_CATEGORY");
        let generator = Arc::new(StubGenerator::returning(&response));
        let extractor = extractor_returning(Arc::clone(&generator));

        let err = extractor.extract_information("report text").await.unwrap_err();

        match &err {
            ExtractionError::SchemaValidation(e) => {
                assert!(e.mentions("evidence_items[0].category"), "{e}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("evidence_items[0].category"));
        assert_eq!(generator.prompts().len(), 1, "generation must not be retried");
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_not_replaced() {
        let response = SINGLE_ITEM_RESPONSE.replace("2025-02-10T09:30:00Z", "not-a-date");
        let generator = Arc::new(StubGenerator::returning(&response));
        let extractor = extractor_returning(generator);

        let err = extractor.extract_information("report text").await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::SchemaValidation(ref e) if e.mentions("metadata.extraction_timestamp")
        ));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let generator = Arc::new(StubGenerator::failing("quota exceeded"));
        let extractor = extractor_returning(generator);

        let err = extractor.extract_information("report text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Generation(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_read_document_failure() {
        let generator = Arc::new(StubGenerator::returning(EMPTY_RESPONSE));
        let extractor = extractor_returning(generator);

        let err = extractor.read_document(Path::new("")).unwrap_err();
        assert!(matches!(err, ExtractionError::DocumentRead(_)));
    }
}
