//! HTTP implementations of the search seams.
//!
//! - [`DuckDuckGoBackend`] scrapes the DuckDuckGo HTML results page.
//! - [`HttpPageFetcher`] downloads result pages with a short timeout.

use super::{PageFetcher, SearchBackend};
use crate::config::SearchConfig;
use crate::error::ResearchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Search backend backed by `html.duckduckgo.com`.
pub struct DuckDuckGoBackend {
    endpoint: String,
    http_client: reqwest::Client,
}

impl DuckDuckGoBackend {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create search HTTP client")?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    async fn search_urls(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<String>, ResearchError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResearchError::search(format!(
                "search endpoint returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let urls = parse_result_links(&body, max_results)?;
        debug!("Backend returned {} URLs for '{}'", urls.len(), query);

        Ok(urls)
    }
}

/// Pull result URLs out of a DuckDuckGo HTML page, in page order.
pub fn parse_result_links(html: &str, max_results: usize) -> Result<Vec<String>, ResearchError> {
    let link_sel = Selector::parse("a.result__a").map_err(ResearchError::search)?;
    let doc = Html::parse_document(html);

    let urls = doc
        .select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .map(decode_redirect)
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .take(max_results)
        .collect();

    Ok(urls)
}

/// Unwrap `//duckduckgo.com/l/?uddg=<encoded>&rut=...` redirect links.
fn decode_redirect(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + "uddg=".len();
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        }
    }
    href.to_string()
}

/// Fetches result pages over HTTP.
pub struct HttpPageFetcher {
    http_client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.page_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create page HTTP client")?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ResearchError> {
        let enrichment = |reason: String| ResearchError::Enrichment {
            url: url.to_string(),
            reason,
        };

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                enrichment("timed out".to_string())
            } else {
                enrichment(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(enrichment(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(|e| enrichment(e.to_string()))
    }
}
