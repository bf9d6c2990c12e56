// src/crawl/frontier.rs
// =============================================================================
// The crawl frontier: which URLs we have seen and which are still waiting.
//
// Two sets:
// - pending: discovered but not yet taken (BTreeSet, so pop order is
//   stable from run to run and logs are easy to compare)
// - visited: already taken for fetching, whatever the outcome
//
// A URL moves pending -> visited exactly once. Visited never shrinks.
//
// Duplicates are filtered twice:
// - on insert, URLs that are already visited are skipped
// - on take, a URL that became visited in the meantime is dropped
//
// Rust concepts:
// - BTreeSet::pop_first: removes and returns the smallest element
// - HashSet::insert returns false when the value was already present
// =============================================================================

use std::collections::{BTreeSet, HashSet};

use crate::links::CanonicalUrl;

#[derive(Debug, Default)]
pub struct Frontier {
    pending: BTreeSet<CanonicalUrl>,
    visited: HashSet<CanonicalUrl>,
}

impl Frontier {
    /// A frontier whose only pending URL is `root`.
    pub fn seeded(root: CanonicalUrl) -> Self {
        let mut frontier = Frontier::default();
        frontier.pending.insert(root);
        frontier
    }

    /// Takes the next URL to fetch and marks it visited.
    ///
    /// URLs that were already visited are skipped. Returns None once nothing
    /// is pending, which is the end of the crawl.
    pub fn next_unvisited(&mut self) -> Option<CanonicalUrl> {
        while let Some(url) = self.pending.pop_first() {
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
            tracing::trace!(%url, "already visited, skipping");
        }
        None
    }

    /// Adds a discovered URL. Returns true if it was not known before.
    pub fn enqueue(&mut self, url: CanonicalUrl) -> bool {
        if self.visited.contains(&url) {
            return false;
        }
        self.pending.insert(url)
    }

    /// Adds many discovered URLs; returns how many were new.
    pub fn enqueue_all(&mut self, urls: impl IntoIterator<Item = CanonicalUrl>) -> usize {
        urls.into_iter().map(|url| self.enqueue(url)).filter(|added| *added).count()
    }

    #[cfg(test)]
    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
