//! prepbrief - client research briefings
//!
//! A CLI tool that searches the web for a company's recent news, financial
//! results and AI adoption signals, summarizes them with Claude when an API
//! key is configured, and writes a Markdown meeting briefing.
//!
//! Exit codes:
//!   0 - Success (the briefing was written, possibly from fallbacks)
//!   1 - Invalid input or runtime error (config, file write, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod planner;
mod report;
mod search;

use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use models::AnalysisSource;
use pipeline::{ResearchPipeline, ResearchRequest};
use planner::{BarProgress, ProgressReporter, SilentProgress};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging so `[general] verbose` can apply
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("prepbrief v{}", env!("CARGO_PKG_VERSION"));
    source.log();
    debug!("Company: {:?}, meeting: {}", args.company, args.meeting_type);

    if let Err(e) = run_research(args, config).await {
        error!("Research failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .prepbrief.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize search limits, timeouts and the Claude model.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` overrides the verbosity flags.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = args.log_level(config.general.verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run one research pass and save the briefing.
async fn run_research(args: Args, config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let request = ResearchRequest {
        company_name: args.company_name().to_string(),
        location: args.location.clone(),
        meeting_type: args.meeting_type,
    };
    let context = pipeline::validate(&request)?;

    let pipeline = ResearchPipeline::from_config(&config, args.api_key.as_deref())?;

    let location_text = context
        .location()
        .map(|l| format!(" in {}", l))
        .unwrap_or_default();
    println!(
        "🔍 Researching {}{} for a {} meeting...",
        context.company_name, location_text, context.meeting_type
    );
    if pipeline.ai_enabled() {
        println!("   Analysis: Claude ({})", config.ai.model);
    } else {
        println!("   Analysis: rule-based (no ANTHROPIC_API_KEY)");
    }

    let mut progress: Box<dyn ProgressReporter> = if args.quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let outcome = pipeline.run(&request, &mut *progress).await?;

    for notice in &outcome.notices {
        warn!("{}", notice);
    }

    if outcome.analysis.source == AnalysisSource::Fallback && pipeline.ai_enabled() {
        println!("⚠️  AI analysis failed; the briefing uses the rule-based summary.");
    }

    println!("📝 Generating briefing...");
    let content = report::render(&outcome, config.general.format)?;
    let path = output_path(&args, &config, &context.company_name);
    let saved = report::save_briefing(&content, &path)?;

    if args.show_results {
        println!("\n🔍 Raw search results:");
        for (topic, results) in outcome.topic_results.iter() {
            println!("   {}: {} result(s)", topic.label(), results.len());
        }
        println!("{}", serde_json::to_string_pretty(&outcome.topic_results)?);
    }

    if args.print {
        println!("\n{}", outcome.briefing);
    }

    println!("\n✅ Research complete!");
    println!("📄 Briefing saved as: {}", saved.display());
    println!(
        "   Topics: {} | Results: {} | Notices: {}",
        outcome.topic_results.len(),
        outcome.topic_results.total_results(),
        outcome.notices.len()
    );

    Ok(())
}

/// Where the briefing goes: --output, or a generated name in the output dir.
fn output_path(args: &Args, config: &Config, company_name: &str) -> PathBuf {
    if let Some(ref path) = args.output {
        return path.clone();
    }

    let filename = report::briefing_filename(company_name, config.general.format, Local::now());
    config.general.output_dir.join(filename)
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_from_dir(Path::new(".")) {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}
