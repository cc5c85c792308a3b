//! Prompt preamble, template loading and placeholder rendering

use std::fs;
use std::path::{Path, PathBuf};

/// Research context prepended to every prompt sent to the generation service
pub const ACADEMIC_RESEARCH_PREAMBLE: &str = r#"
ACADEMIC RESEARCH CONTEXT:
- Research Institution: Observatorios de Riesgos Catastróficos Globales (ORCG)
- Website: orcg.info
- Research Purpose: Academic analysis of AI capabilities for policy recommendations
- Project Goal: Inform policymakers about AI safety measures and capabilities
- Research Ethics: This analysis is conducted under academic oversight for policy research
"#;

#[derive(Debug, thiserror::Error)]
#[error("Failed to load prompt template {}: {source}", path.display())]
pub struct PromptLoadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    #[error("Template references unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),

    #[error("Template has an unclosed placeholder starting at byte {0}")]
    UnclosedPlaceholder(usize),

    #[error("Template has an unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),
}

/// Read a prompt template from disk
pub fn load_template(path: &Path) -> Result<String, PromptLoadError> {
    let template = fs::read_to_string(path).map_err(|source| PromptLoadError {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), length = template.len(), "Loaded prompt template");
    Ok(template)
}

/// Prefix `body` with the research preamble
pub fn with_preamble(body: &str) -> String {
    format!("{ACADEMIC_RESEARCH_PREAMBLE}\n{body}")
}

/// Substitute `{name}` placeholders in `template`
///
/// `{{` and `}}` render as literal braces. Every placeholder must be listed in
/// `values`.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    rendered.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(TemplateError::UnclosedPlaceholder(pos));
                }

                let value = values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or(TemplateError::UnknownPlaceholder(name))?;
                rendered.push_str(value);
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::UnmatchedBrace(pos));
                }
                rendered.push('}');
            }
            other => rendered.push(other),
        }
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_named_placeholders() {
        let rendered = render_template(
            "Old:\n{original_md}\nNew:\n{new_info}",
            &[("original_md", "# Report"), ("new_info", "[]")],
        )
        .unwrap();
        assert_eq!(rendered, "Old:\n# Report\nNew:\n[]");
    }

    #[test]
    fn test_render_escaped_braces() {
        let rendered = render_template("{{\"key\": {value}}}", &[("value", "1")]).unwrap();
        assert_eq!(rendered, "{\"key\": 1}");
    }

    #[test]
    fn test_values_are_not_rendered_again() {
        let rendered = render_template("{new_info}", &[("new_info", "{\"a\": {}}")]).unwrap();
        assert_eq!(rendered, "{\"a\": {}}");
    }

    #[test]
    fn test_unknown_placeholder() {
        let result = render_template("{missing}", &[("original_md", "")]);
        assert_eq!(
            result,
            Err(TemplateError::UnknownPlaceholder("missing".to_string()))
        );
    }

    #[test]
    fn test_unclosed_placeholder() {
        let result = render_template("text {original_md", &[("original_md", "")]);
        assert_eq!(result, Err(TemplateError::UnclosedPlaceholder(5)));
    }

    #[test]
    fn test_unmatched_closing_brace() {
        let result = render_template("a } b", &[]);
        assert_eq!(result, Err(TemplateError::UnmatchedBrace(2)));
    }

    #[test]
    fn test_with_preamble() {
        let prompt = with_preamble("Extract evidence.");
        assert!(prompt.starts_with(ACADEMIC_RESEARCH_PREAMBLE));
        assert!(prompt.ends_with("\nExtract evidence."));
    }

    #[test]
    fn test_load_template_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_template(&dir.path().join("absent.md"));
        assert!(result.is_err());
    }
}
