// src/archive/naming.rs
// =============================================================================
// Maps a canonical URL to the name of the file its page is saved under.
//
//   https://nextdevkit.com/                     -> index
//   https://nextdevkit.com/zh/docs              -> zh_docs
//   https://nextdevkit.com/zh/docs/guide/intro/ -> zh_docs_guide_intro
//
// Only the path takes part in the name. Query strings and hosts don't, so
// two URLs can share a name; the crawl engine notices and reports that.
// =============================================================================

use crate::links::CanonicalUrl;

/// Name used for a URL whose path is empty (the site root).
pub const ROOT_NAME: &str = "index";

/// Extension of every saved page.
pub const ARTIFACT_EXTENSION: &str = "md";

// Characters that Windows (and some sync tools) refuse in file names
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Maps a URL to a filesystem-safe name, without extension.
pub fn map_to_filename(url: &CanonicalUrl) -> String {
    let path = url.path().trim_matches('/');

    if path.is_empty() {
        return ROOT_NAME.to_string();
    }

    path.chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .map(|c| if c == '/' { '_' } else { c })
        .collect()
}

/// The full file name a page is saved under, e.g. `zh_docs_guide.md`.
pub fn artifact_name(url: &CanonicalUrl) -> String {
    format!("{}.{}", map_to_filename(url), ARTIFACT_EXTENSION)
}
