//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::MeetingType;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// prepbrief - research briefings for client meetings
///
/// Searches the web for recent news, financial results and AI adoption
/// signals about a company, summarizes them with Claude when an API key is
/// available, and writes a Markdown briefing.
///
/// Examples:
///   prepbrief --company "Acme Corp"
///   prepbrief --company Tesla --location "Austin TX" --meeting-type proposal
///   prepbrief --company Acme --format json --output acme.json
///   prepbrief --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Name of the company to research
    #[arg(short = 'n', long, value_name = "NAME", required_unless_present = "init_config")]
    pub company: Option<String>,

    /// City, state or zip code to narrow the search
    #[arg(short, long, value_name = "LOCATION")]
    pub location: Option<String>,

    /// Kind of meeting being prepared
    #[arg(short = 't', long, default_value = "discovery", value_name = "TYPE")]
    pub meeting_type: MeetingType,

    /// Anthropic API key
    ///
    /// Leave unset to use the rule-based analysis.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Claude model to use for analysis
    #[arg(short, long, env = "PREPBRIEF_MODEL")]
    pub model: Option<String>,

    /// Maximum tokens in the AI analysis
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Maximum search results per topic
    #[arg(long, value_name = "COUNT")]
    pub max_results: Option<usize>,

    /// Timeout for each result page fetch, in seconds
    #[arg(long, value_name = "SECS")]
    pub page_timeout: Option<u64>,

    /// Directory the briefing is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Exact output file path (overrides --output-dir and the generated name)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Print the briefing to stdout after saving
    #[arg(long)]
    pub print: bool,

    /// Print the raw search results as JSON
    #[arg(long)]
    pub show_results: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .prepbrief.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .prepbrief.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the saved briefing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown briefing (default)
    #[default]
    Markdown,
    /// Briefing plus raw results as JSON
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Company name as given, or empty when unset.
    pub fn company_name(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    ///
    /// The company name itself is checked by the pipeline.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_results == Some(0) {
            return Err("Max results must be at least 1".to_string());
        }

        if self.max_tokens == Some(0) {
            return Err("Max tokens must be at least 1".to_string());
        }

        if self.page_timeout == Some(0) {
            return Err("Page timeout must be at least 1 second".to_string());
        }

        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
