use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_CONFIG_PATH: &str = "EVIDENCE_CONFIG_PATH";
const ENV_EXTRACTION_MODEL: &str = "EXTRACTION_MODEL";
const ENV_COMPOSITION_MODEL: &str = "COMPOSITION_MODEL";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingApiKey(&'static str),
}

/// File locations used by a pipeline run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Extraction instruction template
    pub extraction_prompt: PathBuf,
    /// Composition template with `{original_md}` and `{new_info}` placeholders
    pub composition_prompt: PathBuf,
    /// Report the new evidence is merged into
    pub existing_report: PathBuf,
    /// Destination of the composed report (overwritten)
    pub output_report: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            extraction_prompt: PathBuf::from("data/prompts/extraction-prompt.md"),
            composition_prompt: PathBuf::from("data/prompts/composition-prompt.md"),
            existing_report: PathBuf::from("data/report/current_report.md"),
            output_report: PathBuf::from("data/report/updated_report.md"),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathConfig,
}

/// Application configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub extraction_model: String,
    pub composition_model: String,
    pub paths: PathConfig,
}

impl Config {
    /// Load configuration from the process environment and the config file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration using `lookup` to resolve environment variables
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(ENV_API_KEY))?;

        let extraction_model =
            lookup(ENV_EXTRACTION_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let composition_model =
            lookup(ENV_COMPOSITION_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let config_path =
            lookup(ENV_CONFIG_PATH).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let paths = Self::load_config_file(Path::new(&config_path))
            .map(|cf| cf.paths)
            .unwrap_or_default();

        Ok(Self {
            api_key,
            extraction_model,
            composition_model,
            paths,
        })
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &Path) -> Option<ConfigFile> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config file, using defaults"
                        );
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read config file, using defaults"
                );
                None
            }
        }
    }
}
