// src/links/extract.rs
// =============================================================================
// This module finds links inside rendered page text.
//
// Pages arrive here already converted to Markdown, so a link looks like:
//   [label](target)
//
// We scan with a regular expression instead of a full Markdown parser. The
// rendered text comes from an HTML converter and is not always well-formed
// Markdown (links inside tables, inside raw HTML blocks, unbalanced code
// fences...). A parser would skip some of those; the pattern never does.
//
// Rust concepts:
// - once_cell::sync::Lazy: compile the regex once, on first use
// - Iterators: link_spans returns a lazy iterator over matches
// - HashSet: duplicate links on one page collapse automatically
// =============================================================================

use std::collections::HashSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::{CanonicalUrl, Scope};

// [label](target): label may be empty, target may not. A label that is a
// whole image, as in [![alt](src)](target), is tried first so a linked image
// yields its outer target instead of a span cut off at the image's `]`.
static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(!\[[^\]]*\]\([^)]*\)|[^\]]*)\]\(([^)]+)\)").expect("link pattern is valid")
});

/// One `[label](target)` occurrence in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan<'a> {
    /// Byte range of the whole `[label](target)` text
    pub range: Range<usize>,
    pub label: &'a str,
    pub target: &'a str,
}

impl LinkSpan<'_> {
    /// True when this span is the `[alt](src)` part of an image `![alt](src)`.
    pub fn is_image(&self, content: &str) -> bool {
        content[..self.range.start].ends_with('!')
    }
}

/// Yields every `[label](target)` span in `content`, in document order.
pub fn link_spans(content: &str) -> impl Iterator<Item = LinkSpan<'_>> {
    LINK_PATTERN.captures_iter(content).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(LinkSpan {
            range: whole.range(),
            label: caps.get(1).map_or("", |m| m.as_str()),
            target: caps.get(2)?.as_str(),
        })
    })
}

/// Extracts every in-scope link from a page's text.
///
/// Each target is resolved against `base` (the URL of the page the text came
/// from), stripped of its fragment and checked against `scope`. Labels are
/// ignored. The visited set is NOT consulted here; the frontier does that.
pub fn extract_links(content: &str, base: &CanonicalUrl, scope: &Scope) -> HashSet<CanonicalUrl> {
    link_spans(content)
        .filter_map(|span| scope.normalize(span.target, base))
        .filter(|url| scope.contains(url))
        .collect()
}
