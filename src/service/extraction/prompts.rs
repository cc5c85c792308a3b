//! Prompts for evidence extraction

use crate::service::prompts::with_preamble;

/// Build the extraction prompt: preamble, instruction template, then the report text
pub fn build_extraction_prompt(template: &str, document_text: &str) -> String {
    with_preamble(&format!("{template}\n{document_text}"))
}
