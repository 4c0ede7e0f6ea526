//! Web search with page-title enrichment and a synthetic fallback.
//!
//! The provider asks a [`SearchBackend`] for candidate URLs, fetches each
//! page once through a [`PageFetcher`] to pick up its `<title>`, and never
//! hands back an empty list.

pub mod web;

pub use web::{DuckDuckGoBackend, HttpPageFetcher};

use crate::error::ResearchError;
use crate::models::{today, SearchResult, MAX_TITLE_CHARS, TITLE_ELLIPSIS};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Source of ranked URLs for a free-text query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_urls(&self, query: &str, max_results: usize)
        -> Result<Vec<String>, ResearchError>;
}

/// Retrieves raw page content for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ResearchError>;
}

/// What a single search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results built from live URLs (titles may still be generic).
    Live(Vec<SearchResult>),
    /// The backend failed or found nothing; holds the placeholder result.
    Fallback {
        results: Vec<SearchResult>,
        reason: String,
    },
}

impl SearchOutcome {
    /// Placeholder outcome for `query`.
    pub fn fallback(query: &str, reason: impl Into<String>) -> Self {
        SearchOutcome::Fallback {
            results: vec![SearchResult::placeholder(query, &today())],
            reason: reason.into(),
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::Live(results) => results,
            SearchOutcome::Fallback { results, .. } => results,
        }
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            SearchOutcome::Live(results) => results,
            SearchOutcome::Fallback { results, .. } => results,
        }
    }
}

/// Runs one query and normalizes the hits.
pub struct SearchProvider {
    backend: Box<dyn SearchBackend>,
    fetcher: Box<dyn PageFetcher>,
}

impl SearchProvider {
    pub fn new(backend: Box<dyn SearchBackend>, fetcher: Box<dyn PageFetcher>) -> Self {
        Self { backend, fetcher }
    }

    /// Search for `query`, keeping at most `max_results` hits.
    ///
    /// Never returns an empty result list.
    pub async fn search(&self, query: &str, max_results: usize) -> SearchOutcome {
        debug!("Searching: {}", query);

        let urls = match self.backend.search_urls(query, max_results).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Search failed for '{}': {}", query, e);
                return SearchOutcome::fallback(query, e.to_string());
            }
        };

        if urls.is_empty() {
            info!("No results for '{}', using placeholder", query);
            return SearchOutcome::fallback(query, "no results returned");
        }

        let date = today();
        let mut results = Vec::with_capacity(urls.len().min(max_results));

        for (i, url) in urls.into_iter().take(max_results).enumerate() {
            results.push(self.enrich(i + 1, url, query, &date).await);
        }

        if results.is_empty() {
            info!("No results kept for '{}', using placeholder", query);
            return SearchOutcome::fallback(query, "no results returned");
        }

        SearchOutcome::Live(results)
    }

    /// Fetch the page behind `url` and build its result record.
    ///
    /// A failed fetch still yields a record with a generic title.
    async fn enrich(&self, position: usize, url: String, query: &str, date: &str) -> SearchResult {
        match self.fetcher.fetch(&url).await {
            Ok(body) => {
                let title = extract_title(&body).unwrap_or_else(|| "Search Result".to_string());
                SearchResult {
                    title: truncate_title(&title),
                    snippet: format!("Search result {} for: {}", position, query),
                    url,
                    date: date.to_string(),
                }
            }
            Err(e) => {
                debug!("{}", e);
                SearchResult {
                    title: format!("Search Result {}", position),
                    snippet: format!("Found via search for: {}", query),
                    url,
                    date: date.to_string(),
                }
            }
        }
    }
}

/// Text between the first `<title>` and the next `</title>`, trimmed.
pub fn extract_title(body: &str) -> Option<String> {
    const OPEN: &str = "<title>";
    const CLOSE: &str = "</title>";

    let start = body.find(OPEN)? + OPEN.len();
    let end = start + body[start..].find(CLOSE)?;

    let title = body[start..end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Cut a title to [`MAX_TITLE_CHARS`] characters plus an ellipsis.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let cut: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}{}", cut, TITLE_ELLIPSIS)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backends shared by the pipeline tests.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Backend that always fails and counts its calls.
    #[derive(Clone, Default)]
    pub struct FailingBackend {
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchBackend for FailingBackend {
        async fn search_urls(&self, _: &str, _: usize) -> Result<Vec<String>, ResearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ResearchError::search("network unreachable"))
        }
    }

    /// Backend that returns a fixed URL list.
    #[derive(Clone, Default)]
    pub struct FixedBackend {
        pub urls: Vec<String>,
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchBackend for FixedBackend {
        async fn search_urls(&self, _: &str, _: usize) -> Result<Vec<String>, ResearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.urls.clone())
        }
    }

    /// Fetcher that serves a page for URLs containing "ok" and fails otherwise.
    #[derive(Clone, Default)]
    pub struct PickyFetcher {
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageFetcher for PickyFetcher {
        async fn fetch(&self, url: &str) -> Result<String, ResearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("ok") {
                Ok(format!("<html><head><title> Page at {} </title></head></html>", url))
            } else {
                Err(ResearchError::Enrichment {
                    url: url.to_string(),
                    reason: "HTTP 503".to_string(),
                })
            }
        }
    }

    pub fn provider(
        backend: impl SearchBackend + 'static,
        fetcher: impl PageFetcher + 'static,
    ) -> SearchProvider {
        SearchProvider::new(Box::new(backend), Box::new(fetcher))
    }
}
