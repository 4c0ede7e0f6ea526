//! Briefing document generation.
//!
//! This module renders the Markdown briefing from the analysis text and
//! writes finished briefings to disk.

use crate::cli::OutputFormat;
use crate::models::{MeetingType, ResearchOutcome};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Heading of the fixed checklist section.
pub const CHECKLIST_HEADER: &str = "## Meeting Preparation Checklist";

/// Heading of the fixed next-steps section.
pub const NEXT_STEPS_HEADER: &str = "## Next Steps";

/// Compose the briefing using the current time.
pub fn compose(company_name: &str, meeting_type: MeetingType, analysis: &str) -> String {
    compose_at(company_name, meeting_type, analysis, Local::now())
}

/// Compose the briefing with an explicit preparation time.
pub fn compose_at(
    company_name: &str,
    meeting_type: MeetingType,
    analysis: &str,
    prepared_at: DateTime<Local>,
) -> String {
    let mut output = String::new();

    output.push_str(&generate_header(company_name, meeting_type, prepared_at));

    output.push_str("---\n\n");
    output.push_str(analysis);
    output.push_str("\n\n---\n\n");

    output.push_str(&generate_checklist_section());
    output.push_str(&generate_next_steps_section());
    output.push_str(&generate_footer());

    output
}

/// Title and metadata lines.
fn generate_header(
    company_name: &str,
    meeting_type: MeetingType,
    prepared_at: DateTime<Local>,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("# Client Research Briefing: {}\n\n", company_name));
    // Two trailing spaces force Markdown line breaks.
    section.push_str(&format!("**Meeting Type**: {}  \n", meeting_type.label()));
    section.push_str(&format!(
        "**Date Prepared**: {}  \n",
        prepared_at.format("%Y-%m-%d %H:%M")
    ));
    section.push_str("**Prepared for**: AI Consulting Meeting\n\n");

    section
}

fn generate_checklist_section() -> String {
    let mut section = String::new();

    section.push_str(CHECKLIST_HEADER);
    section.push('\n');
    for item in [
        "Review company website and recent announcements",
        "Prepare questions about current tech stack",
        "Research key decision makers and attendees",
        "Bring relevant case studies from similar companies",
        "Prepare AI readiness assessment questions",
    ] {
        section.push_str(&format!("- [ ] {}\n", item));
    }
    section.push('\n');

    section
}

fn generate_next_steps_section() -> String {
    let mut section = String::new();

    section.push_str(NEXT_STEPS_HEADER);
    section.push('\n');
    for (i, step) in [
        "Schedule follow-up research if needed",
        "Customize presentation materials",
        "Prepare technical demonstrations",
        "Set meeting objectives and success metrics",
    ]
    .iter()
    .enumerate()
    {
        section.push_str(&format!("{}. {}\n", i + 1, step));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "*Generated by Client Research Agent*\n".to_string()
}

/// Generate a JSON document with the briefing and the raw results.
pub fn generate_json_report(outcome: &ResearchOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).map_err(Into::into)
}

/// Render the outcome in the requested format.
pub fn render(outcome: &ResearchOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(outcome.briefing.clone()),
        OutputFormat::Json => generate_json_report(outcome),
    }
}

/// Default file name: `acme_corp_briefing_20240831_1405.md`.
///
/// Anything other than alphanumerics, `-` and `_` in the company name
/// becomes `_`, so the name never leaves the output directory.
pub fn briefing_filename(
    company_name: &str,
    format: OutputFormat,
    prepared_at: DateTime<Local>,
) -> String {
    let stem: String = company_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    format!(
        "{}_briefing_{}.{}",
        stem,
        prepared_at.format("%Y%m%d_%H%M"),
        format.extension()
    )
}

/// Write a rendered briefing, creating the parent directory if needed.
pub fn save_briefing(content: &str, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write briefing to {}", path.display()))?;

    Ok(path.to_path_buf())
}
