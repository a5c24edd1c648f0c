//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use cyberpolicy_extractor::PipelineConfig;
use cyberpolicy_llm::chat::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use cyberpolicy_llm::ChatSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations
    #[serde(default)]
    pub paths: Paths,

    /// Batching, retry and sampling settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Model endpoint settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Where documents are read from and results written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paths {
    /// Root of the per-country document tree
    #[serde(default = "default_policies_dir")]
    pub policies_dir: PathBuf,

    /// Rule collection snapshot
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Optional list of page ranges that were skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_report: Option<PathBuf>,
}

/// Chat-completions endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".cyberpolicy").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one the default path is used
    /// when present, otherwise the built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let path = Self::path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        Self::from_file(&path)
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.pipeline.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

impl LlmConfig {
    /// Provider settings, with the key taken from `api_key` or the configured variable.
    pub fn chat_settings(&self, api_key: Option<String>) -> ChatSettings {
        let api_key = api_key.or_else(|| env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()));
        let settings = ChatSettings::new(&self.endpoint, &self.model).with_timeout_secs(self.timeout_secs);
        match api_key {
            Some(key) => settings.with_api_key(key),
            None => settings,
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            policies_dir: default_policies_dir(),
            output: default_output(),
            skipped_report: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_policies_dir() -> PathBuf {
    PathBuf::from("./policies")
}

fn default_output() -> PathBuf {
    PathBuf::from("./policy_rules_by_country.json")
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paths.policies_dir, PathBuf::from("./policies"));
        assert_eq!(config.paths.output, PathBuf::from("./policy_rules_by_country.json"));
        assert_eq!(config.pipeline.max_words, 2048);
        assert_eq!(config.llm.api_key_env, "DEEPSEEK_API_KEY");
        assert!(config.settings.color);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[paths]\npolicies_dir = \"docs\"\n\n[pipeline]\nmax_words = 500\n\n[llm]\nmodel = \"deepseek-reasoner\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.paths.policies_dir, PathBuf::from("docs"));
        assert_eq!(config.paths.output, default_output());
        assert_eq!(config.pipeline.max_words, 500);
        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.llm.model, "deepseek-reasoner");
        assert_eq!(config.llm.endpoint, default_endpoint());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.paths.skipped_report = Some(PathBuf::from("skipped.json"));
        config.settings.format = OutputFormat::Json;
        config.save(&path).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_pipeline_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[pipeline]\nmax_words = 0\n").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let llm = LlmConfig {
            api_key_env: "CYBERPOLICY_TEST_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.chat_settings(None).api_key, None);
        assert_eq!(
            llm.chat_settings(Some("sk-test".to_string())).api_key.as_deref(),
            Some("sk-test")
        );
    }
}
