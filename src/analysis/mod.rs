//! Two-tier analysis of gathered search results.
//!
//! With a completion client the results are summarized by a language model.
//! Without one, or when the call fails, a fixed template keyed on the
//! company name is used instead.

pub mod anthropic;
pub mod prompt;

pub use anthropic::AnthropicClient;
pub use prompt::{build_prompt, fallback_analysis};

use crate::config::AiConfig;
use crate::error::ResearchError;
use crate::models::{Analysis, AnalysisSource, MeetingType, Notice, TopicResults};
use async_trait::async_trait;
use tracing::{info, warn};

/// Expected prefix of an Anthropic API key. Advisory only.
pub const CREDENTIAL_PREFIX: &str = "sk-ant-";

/// A single-turn completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub prompt: &'a str,
}

/// Language model backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ResearchError>;
}

/// Returns the credential if it can be used at all (non-blank).
pub fn usable_credential(credential: Option<&str>) -> Option<&str> {
    credential.map(str::trim).filter(|c| !c.is_empty())
}

/// Whether the credential has the usual Anthropic key prefix.
pub fn credential_looks_valid(credential: &str) -> bool {
    credential.trim().starts_with(CREDENTIAL_PREFIX)
}

/// Produces the analysis text for a meeting.
pub struct AnalysisEngine {
    client: Option<Box<dyn CompletionClient>>,
    model: String,
    max_tokens: u32,
}

impl AnalysisEngine {
    pub fn new(client: Option<Box<dyn CompletionClient>>, config: &AiConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Engine that always uses the rule-based template.
    pub fn rule_based() -> Self {
        Self::new(None, &AiConfig::default())
    }

    /// Engine for an optional credential.
    ///
    /// Blank credentials yield a rule-based engine. A credential without the
    /// usual prefix is still tried; the returned notice says so.
    pub fn from_credential(
        credential: Option<&str>,
        config: &AiConfig,
    ) -> anyhow::Result<(Self, Option<Notice>)> {
        let Some(key) = usable_credential(credential) else {
            return Ok((Self::rule_based(), None));
        };

        let notice = if credential_looks_valid(key) {
            None
        } else {
            warn!("API key does not start with '{}'", CREDENTIAL_PREFIX);
            Some(Notice::CredentialFormat)
        };

        let client = AnthropicClient::new(key, config)?;
        Ok((Self::new(Some(Box::new(client)), config), notice))
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Analyze the results for a meeting.
    ///
    /// Always returns usable text. A notice is returned when the AI tier
    /// was skipped or failed.
    pub async fn analyze(
        &self,
        company_name: &str,
        meeting_type: MeetingType,
        results: &TopicResults,
    ) -> (Analysis, Option<Notice>) {
        let Some(client) = self.client.as_deref() else {
            info!("No API key configured, using rule-based analysis");
            return (
                fallback(company_name),
                Some(Notice::AiUnavailable {
                    reason: "no API key configured".to_string(),
                }),
            );
        };

        match self.ai_analysis(client, company_name, meeting_type, results).await {
            Ok(text) => (
                Analysis {
                    text,
                    source: AnalysisSource::Ai,
                },
                None,
            ),
            Err(e) => {
                warn!("AI analysis failed: {}", e);
                (
                    fallback(company_name),
                    Some(Notice::AiUnavailable {
                        reason: e.to_string(),
                    }),
                )
            }
        }
    }

    async fn ai_analysis(
        &self,
        client: &dyn CompletionClient,
        company_name: &str,
        meeting_type: MeetingType,
        results: &TopicResults,
    ) -> Result<String, ResearchError> {
        let prompt = build_prompt(company_name, meeting_type, results)?;
        info!("Analyzing findings with {}", self.model);

        client
            .complete(CompletionRequest {
                model: &self.model,
                max_tokens: self.max_tokens,
                prompt: &prompt,
            })
            .await
    }
}

fn fallback(company_name: &str) -> Analysis {
    Analysis {
        text: fallback_analysis(company_name),
        source: AnalysisSource::Fallback,
    }
}
