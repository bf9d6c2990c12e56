// src/fetch/mod.rs
// =============================================================================
// This module turns a URL into page text.
//
// The crawl engine talks to a PageFetcher trait object and never to the
// network directly. That keeps the traversal logic testable with a fake
// fetcher that serves pages from memory.
//
// Submodules:
// - http: HttpFetcher, the real implementation (reqwest)
// - render: HTML -> Markdown (scraper + htmd), word counting (pulldown-cmark)
//
// Two ways a fetch can go wrong, and the engine treats them the same:
// - Ok(FetchOutcome { success: false, .. }): the fetcher ran and rejected the
//   page (HTTP 404, too few words, ...)
// - Err(FetchError): the fetcher itself failed (DNS, timeout, bad HTML...)
// =============================================================================

mod http;
mod render;

pub use http::HttpFetcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::links::CanonicalUrl;

/// Knobs passed to the fetcher with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Pages with fewer words than this are rejected as trivial.
    pub word_count_threshold: usize,
    /// Rewrite links to other hosts into plain text.
    pub exclude_external_links: bool,
    /// Drop modals, popups and cookie banners before rendering.
    pub remove_overlay_elements: bool,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            word_count_threshold: 10,
            exclude_external_links: true,
            remove_overlay_elements: true,
            timeout_secs: 30,
            user_agent: concat!("docs-archiver/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// What a fetcher reports back for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub success: bool,
    /// Extracted page text (Markdown)
    pub content: Option<String>,
    /// The markup the text was extracted from
    pub rendered_markup: Option<String>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn rendered(content: impl Into<String>, markup: impl Into<String>) -> Self {
        FetchOutcome {
            success: true,
            content: Some(content.into()),
            rendered_markup: Some(markup.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        FetchOutcome {
            success: false,
            content: None,
            rendered_markup: None,
            error: Some(error.into()),
        }
    }

    /// Collapses the outcome into "usable text" or "why not".
    ///
    /// A success without content, or with only whitespace, counts as a
    /// failure: there is nothing worth saving.
    pub fn into_content(self) -> Result<String, String> {
        if !self.success {
            return Err(self
                .error
                .unwrap_or_else(|| "fetcher reported failure".to_string()));
        }

        match self.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err("empty content".to_string()),
        }
    }
}

/// Errors raised by a fetcher (as opposed to a page it rejected).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("render failed: {0}")]
    Render(String),
}

/// Renders a URL into text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &CanonicalUrl,
        options: &FetchOptions,
    ) -> Result<FetchOutcome, FetchError>;
}
