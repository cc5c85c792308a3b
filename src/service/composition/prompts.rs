//! Prompts for report composition

use crate::service::prompts::{TemplateError, render_template, with_preamble};

/// Build the composition prompt from the preamble-prefixed template
///
/// The template receives the current report as `{original_md}` and the
/// serialized evidence as `{new_info}`.
pub fn build_composition_prompt(
    template: &str,
    original_md: &str,
    new_info: &str,
) -> Result<String, TemplateError> {
    render_template(
        &with_preamble(template),
        &[("original_md", original_md), ("new_info", new_info)],
    )
}
