// src/fetch/render.rs
// =============================================================================
// HTML -> Markdown.
//
// Steps:
// 1. Parse the HTML with scraper
// 2. Detach overlay elements (modals, popups, cookie banners) from the tree
// 3. Convert what is left to Markdown with htmd
// 4. Optionally turn links to other sites into plain text (a link is
//    external when its host does not contain the crawl domain)
// 5. Count words so the fetcher can reject near-empty pages
// =============================================================================

use htmd::HtmlToMarkdown;
use pulldown_cmark::{Event, Parser};
use scraper::{Html, Selector};

use super::FetchError;
use crate::links::{link_spans, CanonicalUrl, Scope};

// Never part of the page text
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

const OVERLAY_SELECTORS: &[&str] = &[
    "dialog",
    "[role=\"dialog\"]",
    "[role=\"alertdialog\"]",
    "[aria-modal=\"true\"]",
    ".modal",
    ".popup",
    ".overlay",
    ".cookie-banner",
    ".cookie-consent",
    "#cookie-consent",
];

/// A page after rendering.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub markdown: String,
    /// The HTML that was converted (overlays already removed)
    pub markup: String,
    pub word_count: usize,
}

pub fn render_page(
    html: &str,
    page: &CanonicalUrl,
    site: &Scope,
    remove_overlays: bool,
    exclude_external_links: bool,
) -> Result<RenderedPage, FetchError> {
    let mut document = Html::parse_document(html);

    if remove_overlays {
        remove_elements(&mut document, OVERLAY_SELECTORS)?;
    }

    let markup = document.html();

    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();
    let mut markdown = converter
        .convert(&markup)
        .map_err(|e| FetchError::Render(e.to_string()))?;

    if exclude_external_links {
        markdown = strip_external_links(&markdown, page, site);
    }

    let word_count = count_markdown_words(&markdown);

    Ok(RenderedPage {
        markdown,
        markup,
        word_count,
    })
}

// Detaches every element matching any of the selectors
fn remove_elements(document: &mut Html, selectors: &[&str]) -> Result<(), FetchError> {
    for raw in selectors {
        let selector = Selector::parse(raw)
            .map_err(|e| FetchError::Render(format!("invalid selector {raw}: {e:?}")))?;

        // Collect ids first: select() borrows the tree we are about to edit
        let ids: Vec<_> = document.select(&selector).map(|element| element.id()).collect();

        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
    Ok(())
}

// Rewrites [label](https://other.site/...) to `label`. A linked image
// [![alt](src)](https://other.site/...) keeps only its image. Plain images,
// links whose host contains the crawl domain and hostless links (mailto:)
// are left alone.
fn strip_external_links(markdown: &str, page: &CanonicalUrl, site: &Scope) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut cursor = 0;

    for span in link_spans(markdown) {
        if span.is_image(markdown) {
            continue;
        }

        let external = site
            .normalize(span.target, page)
            .map_or(false, |target| target.as_url().has_host() && !site.covers_host(&target));
        if external {
            out.push_str(&markdown[cursor..span.range.start]);
            out.push_str(span.label);
            cursor = span.range.end;
        }
    }

    out.push_str(&markdown[cursor..]);
    out
}

/// Counts words in the text events of a Markdown document.
///
/// Link targets, fences and other markup don't count; inline code does.
pub fn count_markdown_words(markdown: &str) -> usize {
    Parser::new(markdown)
        .map(|event| match event {
            Event::Text(text) | Event::Code(text) => count_words(&text),
            _ => 0,
        })
        .sum()
}

// Whitespace separated words, except that every CJK character is a word of
// its own (Chinese and Japanese text has no spaces between words).
fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .map(|token| {
            let cjk = token.chars().filter(|c| is_cjk(*c)).count();
            let has_other_word = token.chars().any(|c| c.is_alphanumeric() && !is_cjk(c));
            cjk + usize::from(has_other_word)
        })
        .sum()
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'     // Hiragana, Katakana
        | '\u{3400}'..='\u{4DBF}'   // CJK Extension A
        | '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}'   // Hangul syllables
        | '\u{F900}'..='\u{FAFF}'   // CJK Compatibility Ideographs
    )
}
