// src/crawl/mod.rs
// =============================================================================
// This module handles crawling the documentation subtree.
//
// Features:
// - Starts from one root URL and follows every in-scope link
// - Never fetches a URL twice in one run (cycles are fine)
// - Failed pages are recorded and skipped, never retried
// - Optional politeness delay between pages
//
// Submodules:
// - frontier: the visited/pending bookkeeping
// - engine: the Crawler and its report types
// =============================================================================

mod engine;
mod frontier;

pub use engine::{CrawlReport, Crawler};
