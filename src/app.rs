//! Application state and service initialization
//!
//! This module centralizes service construction so that the binary only has to
//! build an [`AppState`] from a [`Config`] and run the pipeline.

use std::sync::Arc;

use crate::document::{PdfDocumentReader, TextDocumentReader};
use crate::model::{Config, ConfigError, PathConfig};
use crate::service::prompts::{PromptLoadError, load_template};
use crate::service::{
    EvaluationPipeline, LlmClient, LlmComposer, LlmExtractor, PipelineError, TextGenerator,
};

/// Application state containing the wired pipeline
pub struct AppState {
    /// Extraction and composition roles with their report paths
    pub pipeline: EvaluationPipeline,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. LLM client initialization (requires GEMINI_API_KEY in `config`)
    /// 2. Prompt template loading for both stages
    /// 3. Pipeline construction
    pub fn new(config: Config) -> Result<Self, AppError> {
        let llm_client = LlmClient::new(&config.api_key)
            .map_err(|_| AppError::InvalidConfig("Invalid GEMINI_API_KEY"))?;

        let extraction_generator: Arc<dyn TextGenerator> =
            Arc::new(llm_client.generator(&config.extraction_model));
        let composition_generator: Arc<dyn TextGenerator> =
            Arc::new(llm_client.generator(&config.composition_model));

        Self::with_generators(config.paths, extraction_generator, composition_generator)
    }

    /// Build application state around the given generators
    pub fn with_generators(
        paths: PathConfig,
        extraction_generator: Arc<dyn TextGenerator>,
        composition_generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, AppError> {
        let extraction_template = load_template(&paths.extraction_prompt)?;
        let composition_template = load_template(&paths.composition_prompt)?;

        let extractor = LlmExtractor::new(
            extraction_generator,
            Arc::new(PdfDocumentReader),
            extraction_template,
        );
        let composer = LlmComposer::new(
            composition_generator,
            Arc::new(TextDocumentReader),
            composition_template,
        );

        let pipeline = EvaluationPipeline::new(
            Box::new(extractor),
            Box::new(composer),
            paths.existing_report,
            paths.output_report,
        );

        Ok(Self { pipeline })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Prompt template could not be read
    #[error(transparent)]
    PromptTemplate(#[from] PromptLoadError),

    /// Unrecognised command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Pipeline run failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
