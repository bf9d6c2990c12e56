// src/fetch/http.rs
// =============================================================================
// The real page fetcher: download with reqwest, render with render.rs.
//
// What counts as a failure outcome (the page is rejected, not retried):
// - Non-2xx status (404, 500, ...)
// - A page with fewer words than FetchOptions::word_count_threshold
//
// What is returned as Err(FetchError):
// - Network problems (timeout, DNS, TLS, connection reset)
// - Rendering problems
//
// Rust concepts:
// - async_trait: lets the trait method be async and still be used through
//   generics or trait objects
// - Client reuse: reqwest::Client keeps a connection pool, so we build it
//   once and hold it for the whole crawl
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::render::render_page;
use super::{FetchError, FetchOptions, FetchOutcome, PageFetcher};
use crate::links::{CanonicalUrl, Scope};

/// Fetches pages over HTTP(S) and renders them to Markdown.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    // Links whose host is covered by this scope are never stripped as external
    site: Scope,
}

impl HttpFetcher {
    /// Builds a fetcher whose client uses the timeout and user agent from
    /// `options`.
    pub fn new(options: &FetchOptions, site: Scope) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(HttpFetcher { client, site })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &CanonicalUrl,
        options: &FetchOptions,
    ) -> Result<FetchOutcome, FetchError> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(FetchOutcome::failed(format!("HTTP {}", status.as_u16())));
        }

        let html = response.text().await?;
        let page = render_page(
            &html,
            url,
            &self.site,
            options.remove_overlay_elements,
            options.exclude_external_links,
        )?;

        tracing::debug!(%url, words = page.word_count, "page rendered");

        if page.word_count < options.word_count_threshold {
            return Ok(FetchOutcome::failed(format!(
                "only {} words, threshold is {}",
                page.word_count, options.word_count_threshold
            )));
        }

        Ok(FetchOutcome::rendered(page.markdown, page.markup))
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not return Err for a 404?
//    - A 404 is an answer from the server, not a broken fetcher
//    - FetchOutcome::failed carries the reason into the crawl report
//
// 2. Redirects
//    - reqwest follows up to 5 redirects; the page is still saved under the
//      URL we asked for, since that is the URL the frontier knows about
// -----------------------------------------------------------------------------
