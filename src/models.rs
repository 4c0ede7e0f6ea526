//! Data models for the research pipeline.
//!
//! This module contains the record shapes that flow between the search,
//! planning, analysis and briefing stages.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum title length kept from a fetched page, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Marker appended to titles that were cut at [`MAX_TITLE_CHARS`].
pub const TITLE_ELLIPSIS: &str = "...";

/// URL used by synthetic placeholder results.
pub const FALLBACK_URL: &str = "https://example.com";

/// Snippet used by synthetic placeholder results.
pub const FALLBACK_SNIPPET: &str =
    "This would contain actual search result content from a real search API.";

/// Today's date in `YYYY-MM-DD` form.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// A single normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title, at most 100 characters plus an ellipsis marker.
    pub title: String,
    /// Short description of the hit.
    pub snippet: String,
    /// Address of the page.
    pub url: String,
    /// ISO date (`YYYY-MM-DD`) the result was recorded.
    pub date: String,
}

impl SearchResult {
    /// Synthetic placeholder returned when the live search produced nothing.
    pub fn placeholder(query: &str, date: &str) -> Self {
        Self {
            title: format!("Sample result for: {}", query),
            snippet: FALLBACK_SNIPPET.to_string(),
            url: FALLBACK_URL.to_string(),
            date: date.to_string(),
        }
    }
}

/// Research topics, in the order they are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    RecentNews,
    FinancialUpdates,
    AiTrends,
}

impl Topic {
    /// All topics in plan order.
    pub const ALL: [Topic; 3] = [Topic::RecentNews, Topic::FinancialUpdates, Topic::AiTrends];

    /// Stable key used in serialized output.
    pub fn key(&self) -> &'static str {
        match self {
            Topic::RecentNews => "recent_news",
            Topic::FinancialUpdates => "financial_updates",
            Topic::AiTrends => "ai_trends",
        }
    }

    /// Human-readable label ("recent news").
    pub fn label(&self) -> &'static str {
        match self {
            Topic::RecentNews => "recent news",
            Topic::FinancialUpdates => "financial updates",
            Topic::AiTrends => "ai trends",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Search results grouped by topic.
///
/// Always holds every [`Topic`] exactly once, in plan order, each with at
/// least one result. The only way to build one is [`TopicResults::from_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResults {
    entries: Vec<(Topic, Vec<SearchResult>)>,
}

impl TopicResults {
    /// Build from per-topic results.
    ///
    /// Entries are reordered to plan order. A topic that is missing or empty
    /// is filled with a placeholder so the invariant holds.
    pub fn from_entries(entries: Vec<(Topic, Vec<SearchResult>)>, date: &str) -> Self {
        let mut ordered = Vec::with_capacity(Topic::ALL.len());

        for topic in Topic::ALL {
            let results = entries
                .iter()
                .find(|(t, _)| *t == topic)
                .map(|(_, r)| r.clone())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| vec![SearchResult::placeholder(topic.label(), date)]);
            ordered.push((topic, results));
        }

        Self { entries: ordered }
    }

    /// Results for one topic.
    #[cfg(test)]
    pub fn get(&self, topic: Topic) -> &[SearchResult] {
        self.entries
            .iter()
            .find(|(t, _)| *t == topic)
            .map(|(_, r)| r.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate topics in plan order.
    pub fn iter(&self) -> impl Iterator<Item = (Topic, &[SearchResult])> {
        self.entries.iter().map(|(t, r)| (*t, r.as_slice()))
    }

    /// Number of topics (always three).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of results across all topics.
    pub fn total_results(&self) -> usize {
        self.entries.iter().map(|(_, r)| r.len()).sum()
    }
}

impl Serialize for TopicResults {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (topic, results) in &self.entries {
            map.serialize_entry(topic.key(), results)?;
        }
        map.end()
    }
}

/// Kind of meeting the briefing prepares for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingType {
    #[default]
    Discovery,
    FollowUp,
    Proposal,
}

impl MeetingType {
    /// Lowercase identifier ("follow-up").
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Discovery => "discovery",
            MeetingType::FollowUp => "follow-up",
            MeetingType::Proposal => "proposal",
        }
    }

    /// Title-cased label used in the briefing header ("Follow-Up").
    pub fn label(&self) -> &'static str {
        match self {
            MeetingType::Discovery => "Discovery",
            MeetingType::FollowUp => "Follow-Up",
            MeetingType::Proposal => "Proposal",
        }
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who is being researched and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingContext {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub meeting_type: MeetingType,
}

impl MeetingContext {
    /// Location text with surrounding whitespace removed, if any is left.
    pub fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// Which tier produced the analysis text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Ai,
    Fallback,
}

/// Analysis text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub text: String,
    pub source: AnalysisSource,
}

/// Advisory message about a degraded pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// A topic's live search failed or was empty.
    TopicFallback { topic: Topic, reason: String },
    /// The AI tier was skipped or failed.
    AiUnavailable { reason: String },
    /// The credential does not look like an Anthropic key.
    CredentialFormat,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::TopicFallback { topic, reason } => {
                write!(f, "Search failed for {}: {}", topic.key(), reason)
            }
            Notice::AiUnavailable { reason } => write!(f, "AI analysis unavailable: {}", reason),
            Notice::CredentialFormat => {
                write!(f, "API key does not start with 'sk-ant-'; trying it anyway")
            }
        }
    }
}

/// Everything a research run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub context: MeetingContext,
    pub topic_results: TopicResults,
    pub analysis: Analysis,
    pub briefing: String,
    pub notices: Vec<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            snippet: String::new(),
            url: "https://acme.test".to_string(),
            date: "2024-08-31".to_string(),
        }
    }

    #[test]
    fn test_topic_keys() {
        let keys: Vec<_> = Topic::ALL.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["recent_news", "financial_updates", "ai_trends"]);
    }

    #[test]
    fn test_topic_results_plan_order_and_fill() {
        let results = TopicResults::from_entries(
            vec![
                (Topic::AiTrends, vec![result("ai")]),
                (Topic::RecentNews, vec![result("news"), result("more news")]),
                (Topic::FinancialUpdates, vec![]),
            ],
            "2024-08-31",
        );

        let topics: Vec<_> = results.iter().map(|(t, _)| t).collect();
        assert_eq!(topics, Topic::ALL.to_vec());
        assert_eq!(results.get(Topic::RecentNews).len(), 2);
        assert_eq!(results.get(Topic::FinancialUpdates).len(), 1);
        assert_eq!(results.get(Topic::FinancialUpdates)[0].url, FALLBACK_URL);
        assert_eq!(results.total_results(), 4);
    }

    #[test]
    fn test_topic_results_serialize_in_order() {
        let results = TopicResults::from_entries(vec![], "2024-08-31");
        let json = serde_json::to_string(&results).unwrap();

        let news = json.find("\"recent_news\"").unwrap();
        let financial = json.find("\"financial_updates\"").unwrap();
        let ai = json.find("\"ai_trends\"").unwrap();
        assert!(news < financial && financial < ai);
    }

    #[test]
    fn test_meeting_type_labels() {
        assert_eq!(MeetingType::Discovery.label(), "Discovery");
        assert_eq!(MeetingType::FollowUp.label(), "Follow-Up");
        assert_eq!(MeetingType::Proposal.label(), "Proposal");
        assert_eq!(MeetingType::FollowUp.to_string(), "follow-up");
    }

    #[test]
    fn test_context_location_trimmed() {
        let mut context = MeetingContext {
            company_name: "Acme".to_string(),
            location: Some("   ".to_string()),
            meeting_type: MeetingType::Discovery,
        };
        assert_eq!(context.location(), None);

        context.location = Some(" Austin TX ".to_string());
        assert_eq!(context.location(), Some("Austin TX"));
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::TopicFallback {
            topic: Topic::AiTrends,
            reason: "timeout".to_string(),
        };
        assert_eq!(notice.to_string(), "Search failed for ai_trends: timeout");
    }
}
