pub mod composition;
pub mod extraction;
pub mod llm;
pub mod pipeline;
pub mod prompts;

pub use composition::{Composer, CompositionError, LlmComposer};
pub use extraction::{ExtractionError, Extractor, LlmExtractor};
pub use llm::{GenerationError, LlmClient, TextGenerator};
pub use pipeline::{CompositionStatus, EvaluationPipeline, EvaluationStatus, PipelineError};
