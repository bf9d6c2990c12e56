// src/crawl/engine.rs
// =============================================================================
// The crawl loop.
//
// How it works:
// 1. Start with the root URL pending
// 2. Take a pending URL that hasn't been visited, mark it visited
// 3. Fetch it through the PageFetcher
// 4. On success: save it through the ArtifactWriter, extract its links,
//    add the in-scope ones that aren't visited yet to pending
// 5. On failure: log it, record it in the report, move on (no retry)
// 6. Repeat until nothing is pending
//
// The loop is iterative (a work queue, not recursion) and sequential: one
// page is fetched, saved and scanned before the next one starts. All state
// lives in a Frontier created by run(), so two runs never share anything.
//
// Rust concepts:
// - Generics with trait bounds: Crawler<F: PageFetcher, W: ArtifactWriter>
// - catch_unwind: a panicking fetcher becomes a failed page, not a dead run
// - map_err + ?: turning an io::Error into our own CrawlError
// =============================================================================

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::frontier::Frontier;
use crate::archive::{artifact_name, render_artifact, ArtifactWriter};
use crate::error::CrawlError;
use crate::fetch::{FetchOptions, PageFetcher};
use crate::links::{extract_links, CanonicalUrl, Scope};

/// A page that was fetched and saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedPage {
    pub url: CanonicalUrl,
    pub file: String,
}

/// A page that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPage {
    pub url: CanonicalUrl,
    pub reason: String,
}

/// Two different URLs that were saved under the same file name. The later
/// one replaced the earlier one on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameCollision {
    pub file: String,
    pub replaced: CanonicalUrl,
    pub by: CanonicalUrl,
}

/// Everything a finished crawl reports.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub root: CanonicalUrl,
    /// Number of URLs taken from the frontier, successful or not
    pub pages_processed: usize,
    pub saved: Vec<SavedPage>,
    pub failed: Vec<FailedPage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<FilenameCollision>,
}

impl CrawlReport {
    fn new(root: CanonicalUrl) -> Self {
        CrawlReport {
            root,
            pages_processed: 0,
            saved: Vec::new(),
            failed: Vec::new(),
            collisions: Vec::new(),
        }
    }
}

/// Crawls one documentation subtree.
pub struct Crawler<F, W> {
    scope: Scope,
    fetcher: F,
    writer: W,
    options: FetchOptions,
    delay: Duration,
}

impl<F, W> Crawler<F, W>
where
    F: PageFetcher,
    W: ArtifactWriter,
{
    pub fn new(scope: Scope, fetcher: F, writer: W) -> Self {
        Crawler {
            scope,
            fetcher,
            writer,
            options: FetchOptions::default(),
            delay: Duration::ZERO,
        }
    }

    /// Options handed to the fetcher with every request.
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Pause between two pages.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Crawls everything reachable from `root` inside the scope.
    ///
    /// Per-page failures are recorded in the report. Only a failed write
    /// returns an error.
    ///
    /// The root is always fetched, even when it lies outside the scope; only
    /// discovered links go through the scope filter.
    pub async fn run(&self, root: CanonicalUrl) -> Result<CrawlReport, CrawlError> {
        if !self.scope.contains(&root) {
            warn!(
                %root,
                domain = self.scope.domain(),
                prefix = self.scope.path_prefix(),
                "root URL is outside the crawl scope, only in-scope links will be followed"
            );
        }

        let mut frontier = Frontier::seeded(root.clone());
        let mut report = CrawlReport::new(root);
        // file name -> URL saved under it in this run
        let mut written: HashMap<String, CanonicalUrl> = HashMap::new();

        while let Some(url) = frontier.next_unvisited() {
            info!(
                page = frontier.visited_count(),
                pending = frontier.pending_count(),
                %url,
                "crawling"
            );

            let content = match self.fetch_content(&url).await {
                Ok(content) => content,
                Err(reason) => {
                    warn!(%url, %reason, "fetch failed");
                    report.failed.push(FailedPage { url, reason });
                    self.pause(&frontier).await;
                    continue;
                }
            };

            let file = artifact_name(&url);
            if let Some(replaced) = written.insert(file.clone(), url.clone()) {
                warn!(%file, %replaced, by = %url, "file name collision, overwriting");
                report.collisions.push(FilenameCollision {
                    file: file.clone(),
                    replaced,
                    by: url.clone(),
                });
            }

            let body = render_artifact(&url, &content);
            self.writer
                .write(&file, &body)
                .await
                .map_err(|source| CrawlError::Write {
                    name: file.clone(),
                    source,
                })?;
            info!(%file, "saved");

            let links = extract_links(&content, &url, &self.scope);
            if !links.is_empty() {
                let found = links.len();
                let new = frontier.enqueue_all(links);
                info!(found, new, "discovered links");
            }

            report.saved.push(SavedPage { url, file });
            self.pause(&frontier).await;
        }

        report.pages_processed = frontier.visited_count();
        Ok(report)
    }

    // Fetches one page. Every way of failing (an error, a failure outcome,
    // empty content, a panic) collapses into Err(reason).
    async fn fetch_content(&self, url: &CanonicalUrl) -> Result<String, String> {
        let attempt = AssertUnwindSafe(self.fetcher.fetch(url, &self.options))
            .catch_unwind()
            .await;

        match attempt {
            Ok(Ok(outcome)) => {
                if let Some(markup) = &outcome.rendered_markup {
                    debug!(%url, markup_bytes = markup.len(), "fetched");
                }
                outcome.into_content()
            }
            Ok(Err(error)) => Err(error.to_string()),
            Err(panic) => Err(format!("fetcher panicked: {}", panic_message(&*panic))),
        }
    }

    async fn pause(&self, frontier: &Frontier) {
        if !self.delay.is_zero() && frontier.pending_count() > 0 {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchOutcome};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::Mutex;

    // How the fake site answers for one URL
    enum Page {
        Content(&'static str),
        Rejected(&'static str),
        Broken,
        Panics,
    }

    // Serves pages from memory and remembers every URL it was asked for
    struct FakeSite {
        pages: HashMap<String, Page>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn new(pages: Vec<(&str, Page)>) -> Self {
            FakeSite {
                pages: pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn call_count(&self, url: &str) -> usize {
            self.calls().iter().filter(|called| called.as_str() == url).count()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch(
            &self,
            url: &CanonicalUrl,
            _options: &FetchOptions,
        ) -> Result<FetchOutcome, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(Page::Content(text)) => Ok(FetchOutcome::rendered(*text, "<html></html>")),
                Some(Page::Rejected(reason)) => Ok(FetchOutcome::failed(*reason)),
                Some(Page::Broken) => Err(FetchError::Render("connection reset".to_string())),
                Some(Page::Panics) => panic!("renderer crashed"),
                None => Ok(FetchOutcome::failed("HTTP 404")),
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<BTreeMap<String, String>>,
        read_only: bool,
    }

    impl MemoryStore {
        fn names(&self) -> Vec<String> {
            self.files.lock().unwrap().keys().cloned().collect()
        }

        fn get(&self, name: &str) -> Option<String> {
            self.files.lock().unwrap().get(name).cloned()
        }
    }

    #[async_trait]
    impl ArtifactWriter for MemoryStore {
        async fn write(&self, name: &str, content: &str) -> io::Result<()> {
            if self.read_only {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.files
                .lock()
                .unwrap()
                .insert(name.to_string(), content.to_string());
            Ok(())
        }
    }

    const ROOT: &str = "https://example.com/";

    fn crawler(pages: Vec<(&str, Page)>) -> Crawler<FakeSite, MemoryStore> {
        Crawler::new(
            Scope::new("example.com", "/"),
            FakeSite::new(pages),
            MemoryStore::default(),
        )
    }

    fn root() -> CanonicalUrl {
        CanonicalUrl::parse(ROOT).unwrap()
    }

    #[tokio::test]
    async fn test_single_page_without_links() {
        let crawler = crawler(vec![(ROOT, Page::Content("Welcome to the docs."))]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 1);
        assert_eq!(crawler.writer.names(), vec!["index.md"]);
        assert_eq!(
            crawler.writer.get("index.md").unwrap(),
            "# 来源: https://example.com/\n\n---\n\nWelcome to the docs."
        );
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_scope_links_are_never_fetched() {
        let crawler = crawler(vec![
            (
                ROOT,
                Page::Content("[A](/a) [B](https://example.com/b) [C](https://other.org/c)"),
            ),
            ("https://example.com/a", Page::Content("Page A")),
            ("https://example.com/b", Page::Content("Page B")),
            ("https://other.org/c", Page::Content("Page C")),
        ]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 3);
        assert_eq!(crawler.writer.names(), vec!["a.md", "b.md", "index.md"]);
        assert_eq!(crawler.fetcher.call_count("https://other.org/c"), 0);
    }

    #[tokio::test]
    async fn test_back_links_and_fragments_are_not_refetched() {
        let crawler = crawler(vec![
            (ROOT, Page::Content("[A](/a) [B](/b)")),
            (
                "https://example.com/a",
                Page::Content("[home](/) [B, section 2](/b#section) [self](#top)"),
            ),
            ("https://example.com/b", Page::Content("Page B")),
        ]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 3);
        for url in [ROOT, "https://example.com/a", "https://example.com/b"] {
            assert_eq!(crawler.fetcher.call_count(url), 1, "{url} fetched more than once");
        }
        assert_eq!(crawler.fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_page_is_visited_but_not_saved() {
        let crawler = crawler(vec![
            (ROOT, Page::Content("[A](/a) [D](/d) [B](/b)")),
            ("https://example.com/a", Page::Content("Page A")),
            ("https://example.com/b", Page::Content("Page B")),
            ("https://example.com/d", Page::Rejected("HTTP 500")),
        ]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 4);
        assert_eq!(crawler.writer.names(), vec!["a.md", "b.md", "index.md"]);
        assert_eq!(
            report.failed,
            vec![FailedPage {
                url: CanonicalUrl::parse("https://example.com/d").unwrap(),
                reason: "HTTP 500".to_string(),
            }]
        );
        assert_eq!(crawler.fetcher.call_count("https://example.com/d"), 1);
    }

    #[tokio::test]
    async fn test_errors_panics_and_empty_pages_are_failures() {
        let crawler = crawler(vec![
            (
                ROOT,
                Page::Content("[e](/error) [p](/panic) [m](/missing) [w](/blank) [ok](/ok)"),
            ),
            ("https://example.com/error", Page::Broken),
            ("https://example.com/panic", Page::Panics),
            ("https://example.com/blank", Page::Content("   ")),
            ("https://example.com/ok", Page::Content("fine")),
        ]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 6);
        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.failed.len(), 4);

        let reason = |path: &str| {
            report
                .failed
                .iter()
                .find(|failed| failed.url.path() == path)
                .map(|failed| failed.reason.clone())
                .unwrap()
        };
        assert_eq!(reason("/error"), "render failed: connection reset");
        assert_eq!(reason("/panic"), "fetcher panicked: renderer crashed");
        assert_eq!(reason("/missing"), "HTTP 404");
        assert_eq!(reason("/blank"), "empty content");
    }

    #[tokio::test]
    async fn test_cycles_terminate() {
        let crawler = crawler(vec![
            (ROOT, Page::Content("[a](/a) [root](/)")),
            (
                "https://example.com/a",
                Page::Content("[b](/b) [a](/a) [root](https://example.com/)"),
            ),
            ("https://example.com/b", Page::Content("[c](c) [a](/a)")),
            ("https://example.com/c", Page::Content("[root](/) [b](/b#x) [a](../a)")),
        ]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 4);
        assert_eq!(crawler.fetcher.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_rerun_visits_same_pages() {
        let pages = || {
            vec![
                (ROOT, Page::Content("[a](/a) [b](/b)")),
                ("https://example.com/a", Page::Content("[b](/b) [c](/c)")),
                ("https://example.com/b", Page::Content("[a](/a)")),
                ("https://example.com/c", Page::Rejected("HTTP 403")),
            ]
        };
        let crawler = crawler(pages());

        let first = crawler.run(root()).await.unwrap();
        let second = crawler.run(root()).await.unwrap();

        assert_eq!(first.pages_processed, second.pages_processed);
        assert_eq!(first.saved, second.saved);
        assert_eq!(first.failed, second.failed);
    }

    #[tokio::test]
    async fn test_query_variants_are_separate_pages_sharing_a_file() {
        let crawler = crawler(vec![
            (ROOT, Page::Content("[1](/a?tab=1) [2](/a?tab=2)")),
            ("https://example.com/a?tab=1", Page::Content("tab one")),
            ("https://example.com/a?tab=2", Page::Content("tab two")),
        ]);

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 3);
        assert_eq!(report.saved.len(), 3);
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].file, "a.md");
        // Last write wins
        assert!(crawler.writer.get("a.md").unwrap().ends_with("tab two"));
    }

    #[tokio::test]
    async fn test_write_failure_aborts() {
        let crawler = Crawler::new(
            Scope::new("example.com", "/"),
            FakeSite::new(vec![(ROOT, Page::Content("[a](/a)"))]),
            MemoryStore {
                read_only: true,
                ..MemoryStore::default()
            },
        );

        let result = crawler.run(root()).await;

        assert!(matches!(result, Err(CrawlError::Write { ref name, .. }) if name == "index.md"));
        assert_eq!(crawler.fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_root_outside_scope_is_still_crawled() {
        let crawler = Crawler::new(
            Scope::new("example.com", "/docs"),
            FakeSite::new(vec![
                (ROOT, Page::Content("[docs](/docs) [about](/about)")),
                ("https://example.com/docs", Page::Content("Documentation home.")),
            ]),
            MemoryStore::default(),
        );

        let report = crawler.run(root()).await.unwrap();

        assert_eq!(report.pages_processed, 2);
        assert_eq!(crawler.writer.names(), vec!["docs.md", "index.md"]);
        assert_eq!(crawler.fetcher.call_count("https://example.com/about"), 0);
    }

    #[tokio::test]
    async fn test_path_prefix_limits_the_crawl() {
        let crawler = Crawler::new(
            Scope::new("example.com", "/docs"),
            FakeSite::new(vec![
                (
                    "https://example.com/docs",
                    Page::Content("[guide](/docs/guide) [blog](/blog)"),
                ),
                ("https://example.com/docs/guide", Page::Content("[up](/docs)")),
                ("https://example.com/blog", Page::Content("blog")),
            ]),
            MemoryStore::default(),
        );

        let report = crawler
            .run(CanonicalUrl::parse("https://example.com/docs").unwrap())
            .await
            .unwrap();

        assert_eq!(report.pages_processed, 2);
        assert_eq!(crawler.writer.names(), vec!["docs.md", "docs_guide.md"]);
        assert_eq!(crawler.fetcher.call_count("https://example.com/blog"), 0);
    }
}
