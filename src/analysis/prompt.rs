//! Prompt and fallback templates.

use crate::error::ResearchError;
use crate::models::{MeetingType, TopicResults};

/// Instruction prompt for the AI tier.
pub fn build_prompt(
    company_name: &str,
    meeting_type: MeetingType,
    results: &TopicResults,
) -> Result<String, ResearchError> {
    let research = serde_json::to_string_pretty(results).map_err(ResearchError::ai)?;

    Ok(format!(
        r#"Analyze the following research about {company} for a {meeting} meeting with an AI consulting firm.

Research Results:
{research}

Please provide:
1. Key Company Insights (3-5 bullet points)
2. Potential AI Pain Points to Explore (3-4 specific areas)
3. Conversation Starters (3-4 strategic questions)

Format the response as clear, actionable insights for a consulting meeting."#,
        company = company_name,
        meeting = meeting_type,
        research = research,
    ))
}

/// Rule-based analysis used when the AI tier is unavailable.
///
/// Depends only on the company name.
pub fn fallback_analysis(company_name: &str) -> String {
    format!(
        r#"# Analysis for {company_name}

## Key Company Insights
- Research indicates recent activity in the market
- Company appears to be in growth/development phase
- Multiple news sources covering company developments

## Potential AI Pain Points to Explore
- Data management and analytics optimization
- Process automation opportunities
- Customer experience enhancement through AI
- Operational efficiency improvements

## Conversation Starters
- "What are your biggest operational challenges right now?"
- "How are you currently handling data analysis and insights?"
- "What manual processes are taking up most of your team's time?"
- "How do you see AI fitting into your industry's future?"

*Note: This analysis was generated without AI assistance. For deeper insights, configure ANTHROPIC_API_KEY.*
"#
    )
}
