//! Error taxonomy for the research pipeline.
//!
//! Only [`ResearchError::Validation`] ever reaches the caller of the
//! pipeline. The other variants are produced at I/O boundaries and turned
//! into fallback values right where they occur.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResearchError {
    /// The search backend call itself failed.
    #[error("search backend error: {0}")]
    SearchBackend(String),

    /// A single result page could not be fetched.
    #[error("failed to fetch {url}: {reason}")]
    Enrichment { url: String, reason: String },

    /// The language model could not be used.
    #[error("AI unavailable: {0}")]
    AiUnavailable(String),

    /// The request was rejected before any stage ran.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl ResearchError {
    pub fn search(err: impl std::fmt::Display) -> Self {
        Self::SearchBackend(err.to_string())
    }

    pub fn ai(err: impl std::fmt::Display) -> Self {
        Self::AiUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::SearchBackend("request timed out".to_string())
        } else if err.is_connect() {
            Self::SearchBackend("cannot connect to search backend".to_string())
        } else {
            Self::SearchBackend(err.to_string())
        }
    }
}
