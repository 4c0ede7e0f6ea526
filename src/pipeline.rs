//! End-to-end research run.
//!
//! `Idle → Searching → Analyzing → Composing → Done`, with validation before
//! anything leaves the process. Each run is independent of the previous one.

use crate::analysis::AnalysisEngine;
use crate::config::Config;
use crate::error::ResearchError;
use crate::models::{MeetingContext, MeetingType, Notice, ResearchOutcome};
use crate::planner::{ProgressReporter, QueryPlanner};
use crate::report;
use crate::search::{DuckDuckGoBackend, HttpPageFetcher, SearchProvider};
use anyhow::Result;
use std::fmt;
use tracing::debug;

/// Pipeline stages, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Searching,
    Analyzing,
    Composing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Searching => "searching",
            Stage::Analyzing => "analyzing",
            Stage::Composing => "composing",
            Stage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Raw input for one run.
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    pub company_name: String,
    pub location: Option<String>,
    pub meeting_type: MeetingType,
}

/// Check a request and normalize it into a meeting context.
pub fn validate(request: &ResearchRequest) -> Result<MeetingContext, ResearchError> {
    let company_name = request.company_name.trim();
    if company_name.is_empty() {
        return Err(ResearchError::Validation(
            "company name is required".to_string(),
        ));
    }

    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from);

    Ok(MeetingContext {
        company_name: company_name.to_string(),
        location,
        meeting_type: request.meeting_type,
    })
}

/// Search provider, analysis engine and limits for research runs.
pub struct ResearchPipeline {
    provider: SearchProvider,
    engine: AnalysisEngine,
    max_results: usize,
    setup_notices: Vec<Notice>,
}

impl ResearchPipeline {
    pub fn new(provider: SearchProvider, engine: AnalysisEngine, max_results: usize) -> Self {
        Self {
            provider,
            engine,
            max_results,
            setup_notices: Vec::new(),
        }
    }

    /// Pipeline with the HTTP search stack and, if a usable credential is
    /// given, the Anthropic client.
    pub fn from_config(config: &Config, credential: Option<&str>) -> Result<Self> {
        let provider = SearchProvider::new(
            Box::new(DuckDuckGoBackend::new(&config.search)?),
            Box::new(HttpPageFetcher::new(&config.search)?),
        );
        let (engine, notice) = AnalysisEngine::from_credential(credential, &config.ai)?;

        let mut pipeline = Self::new(provider, engine, config.search.max_results);
        pipeline.setup_notices.extend(notice);
        Ok(pipeline)
    }

    /// Whether runs will attempt the AI tier.
    pub fn ai_enabled(&self) -> bool {
        self.engine.has_client()
    }

    /// Run the full pipeline for one request.
    ///
    /// Fails only on validation; every later failure degrades to a fallback.
    pub async fn run(
        &self,
        request: &ResearchRequest,
        progress: &mut dyn ProgressReporter,
    ) -> Result<ResearchOutcome, ResearchError> {
        let mut stage = Stage::Idle;
        let context = validate(request)?;
        let mut notices = self.setup_notices.clone();

        advance(&mut stage, Stage::Searching);
        let planner = QueryPlanner::new(&self.provider, self.max_results);
        let (topic_results, search_notices) = planner
            .gather_company_intel(&context.company_name, context.location(), progress)
            .await;
        notices.extend(search_notices);

        advance(&mut stage, Stage::Analyzing);
        let (analysis, ai_notice) = self
            .engine
            .analyze(&context.company_name, context.meeting_type, &topic_results)
            .await;
        notices.extend(ai_notice);

        advance(&mut stage, Stage::Composing);
        let briefing = report::compose(&context.company_name, context.meeting_type, &analysis.text);

        advance(&mut stage, Stage::Done);

        Ok(ResearchOutcome {
            context,
            topic_results,
            analysis,
            briefing,
            notices,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug_assert!(next > *stage, "stage {} cannot follow {}", next, stage);
    debug!("Pipeline stage: {} -> {}", stage, next);
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::ScriptedClient;
    use crate::analysis::fallback_analysis;
    use crate::config::AiConfig;
    use crate::models::{AnalysisSource, Topic, FALLBACK_URL};
    use crate::planner::testing::RecordingProgress;
    use crate::planner::SilentProgress;
    use crate::search::testing::*;
    use std::sync::atomic::Ordering;

    fn request(company: &str, meeting_type: MeetingType) -> ResearchRequest {
        ResearchRequest {
            company_name: company.to_string(),
            location: Some(String::new()),
            meeting_type,
        }
    }

    #[test]
    fn test_validate_trims() {
        let context = validate(&ResearchRequest {
            company_name: "  Acme Corp ".to_string(),
            location: Some("  ".to_string()),
            meeting_type: MeetingType::Discovery,
        })
        .unwrap();

        assert_eq!(context.company_name, "Acme Corp");
        assert_eq!(context.location, None);
    }

    #[tokio::test]
    async fn test_blank_company_makes_no_calls() {
        for name in ["", "   ", "\t\n"] {
            let backend = FailingBackend::default();
            let searches = backend.calls.clone();
            let fetcher = PickyFetcher::default();
            let fetches = fetcher.calls.clone();
            let client = ScriptedClient::answering("unused");
            let prompts = client.prompts.clone();

            let pipeline = ResearchPipeline::new(
                provider(backend, fetcher),
                AnalysisEngine::new(Some(Box::new(client)), &AiConfig::default()),
                5,
            );
            let mut progress = RecordingProgress::default();

            let result = pipeline
                .run(&request(name, MeetingType::Discovery), &mut progress)
                .await;

            assert!(matches!(result, Err(ResearchError::Validation(_))));
            assert_eq!(searches.load(Ordering::SeqCst), 0);
            assert_eq!(fetches.load(Ordering::SeqCst), 0);
            assert!(prompts.lock().unwrap().is_empty());
            assert!(progress.events.is_empty());
        }
    }

    #[tokio::test]
    async fn test_offline_run_without_credential() {
        let pipeline = ResearchPipeline::new(
            provider(FailingBackend::default(), PickyFetcher::default()),
            AnalysisEngine::rule_based(),
            5,
        );

        let outcome = pipeline
            .run(&request("Acme Corp", MeetingType::Proposal), &mut SilentProgress)
            .await
            .unwrap();

        assert!(outcome.briefing.contains("**Meeting Type**: Proposal"));
        assert!(outcome.briefing.contains("# Analysis for Acme Corp"));
        assert_eq!(outcome.analysis.source, AnalysisSource::Fallback);
        assert_eq!(outcome.analysis.text, fallback_analysis("Acme Corp"));

        assert_eq!(outcome.topic_results.len(), 3);
        for (_, results) in outcome.topic_results.iter() {
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].url, FALLBACK_URL);
        }

        let topic_notices = outcome
            .notices
            .iter()
            .filter(|n| matches!(n, Notice::TopicFallback { .. }))
            .count();
        assert_eq!(topic_notices, 3);
        assert!(outcome
            .notices
            .iter()
            .any(|n| matches!(n, Notice::AiUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_ai_run_embeds_model_text() {
        let backend = FixedBackend {
            urls: vec!["https://ok.acme.test/news".to_string()],
            ..Default::default()
        };
        let client = ScriptedClient::answering("## Key Company Insights\n- Acme ships rockets");
        let prompts = client.prompts.clone();
        let pipeline = ResearchPipeline::new(
            provider(backend, PickyFetcher::default()),
            AnalysisEngine::new(Some(Box::new(client)), &AiConfig::default()),
            5,
        );

        let outcome = pipeline
            .run(
                &ResearchRequest {
                    company_name: "Acme".to_string(),
                    location: Some("Austin TX".to_string()),
                    meeting_type: MeetingType::FollowUp,
                },
                &mut SilentProgress,
            )
            .await
            .unwrap();

        assert!(pipeline.ai_enabled());
        assert_eq!(outcome.analysis.source, AnalysisSource::Ai);
        assert!(outcome.briefing.contains("- Acme ships rockets"));
        assert!(outcome.briefing.contains("Follow-Up"));
        assert!(outcome.notices.is_empty());
        assert_eq!(
            outcome.topic_results.get(Topic::RecentNews)[0].title,
            "Page at https://ok.acme.test/news"
        );

        let prompts = prompts.lock().unwrap();
        assert!(prompts[0].2.contains("https://ok.acme.test/news"));
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let pipeline = ResearchPipeline::new(
            provider(FailingBackend::default(), PickyFetcher::default()),
            AnalysisEngine::rule_based(),
            5,
        );

        let first = pipeline
            .run(&request("Acme", MeetingType::Discovery), &mut SilentProgress)
            .await
            .unwrap();
        let second = pipeline
            .run(&request("Initech", MeetingType::Discovery), &mut SilentProgress)
            .await
            .unwrap();

        assert!(first.briefing.contains("Acme"));
        assert!(!second.briefing.contains("Acme"));
        assert_eq!(first.notices.len(), second.notices.len());
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Idle < Stage::Searching);
        assert!(Stage::Searching < Stage::Analyzing);
        assert!(Stage::Analyzing < Stage::Composing);
        assert!(Stage::Composing < Stage::Done);
    }
}
