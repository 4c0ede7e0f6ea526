//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.prepbrief.toml` files.

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".prepbrief.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Language model settings.
    #[serde(default)]
    pub ai: AiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory briefings are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Output format for saved briefings.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
            format: OutputFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum URLs kept per topic query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Timeout for each result page fetch, in seconds.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_seconds: u64,

    /// Timeout for the search backend call, in seconds.
    #[serde(default = "default_search_timeout")]
    pub search_timeout_seconds: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTML search endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            page_timeout_seconds: default_page_timeout(),
            search_timeout_seconds: default_search_timeout(),
            user_agent: default_user_agent(),
            endpoint: default_search_endpoint(),
        }
    }
}

fn default_max_results() -> usize {
    5
}

fn default_page_timeout() -> u64 {
    5
}

fn default_search_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens in the completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,

    /// Messages API URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_ai_timeout(),
            api_url: default_api_url(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_ai_timeout() -> u64 {
    60
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from `dir/.prepbrief.toml`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.ai.model = model.clone();
        }
        if let Some(max_tokens) = args.max_tokens {
            self.ai.max_tokens = max_tokens;
        }
        if let Some(max_results) = args.max_results {
            self.search.max_results = max_results;
        }
        if let Some(timeout) = args.page_timeout {
            self.search.page_timeout_seconds = timeout;
        }
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Reject limits that would make a run pointless or hang.
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            bail!("search.max_results must be at least 1");
        }
        if self.search.page_timeout_seconds == 0 {
            bail!("search.page_timeout_seconds must be at least 1");
        }
        if self.search.search_timeout_seconds == 0 {
            bail!("search.search_timeout_seconds must be at least 1");
        }
        if self.ai.max_tokens == 0 {
            bail!("ai.max_tokens must be at least 1");
        }
        if self.ai.timeout_seconds == 0 {
            bail!("ai.timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ai.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.ai.max_tokens, 1000);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.page_timeout_seconds, 5);
        assert_eq!(config.general.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "briefings"
verbose = true
format = "json"

[search]
max_results = 3

[ai]
model = "claude-3-haiku-20240307"
max_tokens = 500
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("briefings"));
        assert!(config.general.verbose);
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.page_timeout_seconds, 5);
        assert_eq!(config.ai.model, "claude-3-haiku-20240307");
        assert_eq!(config.ai.max_tokens, 500);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[ai]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.search.endpoint, default_search_endpoint());
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).unwrap().is_none());

        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[search]\nmax_results = 2\n",
        )
        .unwrap();

        let config = Config::load_from_dir(temp_dir.path()).unwrap().unwrap();
        assert_eq!(config.search.max_results, 2);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(Config::default().validate().is_ok());

        let config: Config = toml::from_str("[search]\nmax_results = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));

        let config: Config = toml::from_str("[search]\npage_timeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[ai]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[search\nmax_results = ").unwrap();

        assert!(Config::load(&path).is_err());
    }
}
