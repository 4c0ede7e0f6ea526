//! Topic query planning and sequential execution.
//!
//! One company name expands into three topic queries that run one after
//! another. A failed topic is replaced with a placeholder and never stops
//! the remaining topics.

use crate::models::{today, Notice, Topic, TopicResults};
use crate::search::{SearchOutcome, SearchProvider};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

/// Progress events emitted while gathering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEvent {
    /// Search for a topic started. `index` is 0-based.
    Started { topic: Topic, index: usize, total: usize },
    /// A topic degraded to the placeholder result.
    Degraded { topic: Topic, reason: String },
    /// All topics are done.
    Finished,
}

/// Side channel for gather progress.
pub trait ProgressReporter {
    fn report(&mut self, event: PlanEvent);
}

/// Reporter that drops every event.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn report(&mut self, _event: PlanEvent) {}
}

/// Terminal progress bar.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(Topic::ALL.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn report(&mut self, event: PlanEvent) {
        match event {
            PlanEvent::Started { topic, index, .. } => {
                self.bar.set_position(index as u64 + 1);
                self.bar.set_message(format!("🔍 Searching for {}...", topic.label()));
            }
            PlanEvent::Degraded { topic, reason } => {
                self.bar
                    .println(format!("⚠️  Search failed for {}: {}", topic.key(), reason));
            }
            PlanEvent::Finished => self.bar.finish_with_message("✅ Search complete!"),
        }
    }
}

/// Build the query for each topic, in plan order.
pub fn build_queries(company_name: &str, location: Option<&str>) -> Vec<(Topic, String)> {
    let location_part = match location.map(str::trim) {
        Some(loc) if !loc.is_empty() => format!(" {}", loc),
        _ => String::new(),
    };
    let subject = format!("{}{}", company_name, location_part);

    Topic::ALL
        .iter()
        .map(|&topic| {
            let query = match topic {
                Topic::RecentNews => format!("{} news 2024 recent developments", subject),
                Topic::FinancialUpdates => format!(
                    "{} financial results earnings revenue growth 2024",
                    subject
                ),
                Topic::AiTrends => format!(
                    "{} AI artificial intelligence technology adoption digital transformation",
                    subject
                ),
            };
            (topic, query)
        })
        .collect()
}

/// Runs the topic plan against a search provider.
pub struct QueryPlanner<'a> {
    provider: &'a SearchProvider,
    max_results: usize,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(provider: &'a SearchProvider, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    /// Search every topic for the company.
    ///
    /// Returns the results and a notice per degraded topic.
    pub async fn gather_company_intel(
        &self,
        company_name: &str,
        location: Option<&str>,
        progress: &mut dyn ProgressReporter,
    ) -> (TopicResults, Vec<Notice>) {
        let queries = build_queries(company_name, location);
        let total = queries.len();
        let mut entries = Vec::with_capacity(total);
        let mut notices = Vec::new();

        for (index, (topic, query)) in queries.into_iter().enumerate() {
            progress.report(PlanEvent::Started {
                topic,
                index,
                total,
            });
            info!("Searching {} ({}/{})", topic.label(), index + 1, total);

            let outcome = self.provider.search(&query, self.max_results).await;

            if let SearchOutcome::Fallback { ref reason, .. } = outcome {
                warn!("Using placeholder results for {}", topic.key());
                progress.report(PlanEvent::Degraded {
                    topic,
                    reason: reason.clone(),
                });
                notices.push(Notice::TopicFallback {
                    topic,
                    reason: reason.clone(),
                });
            }

            debug!("{} results for {}", outcome.results().len(), topic.key());
            entries.push((topic, outcome.into_results()));
        }

        progress.report(PlanEvent::Finished);

        (TopicResults::from_entries(entries, &today()), notices)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Reporter that records every event.
    #[derive(Default)]
    pub struct RecordingProgress {
        pub events: Vec<PlanEvent>,
    }

    impl ProgressReporter for RecordingProgress {
        fn report(&mut self, event: PlanEvent) {
            self.events.push(event);
        }
    }
}
