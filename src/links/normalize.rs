// src/links/normalize.rs
// =============================================================================
// This module turns raw link targets into canonical URLs and decides whether
// a URL belongs to the documentation subtree we are archiving.
//
// Canonical form:
// - Absolute (scheme + host + path)
// - Fragment (#...) removed, so /page and /page#section are one document
// - Query string kept as-is (two query variants are two different pages)
//
// Scope:
// - Host must contain the configured domain
// - Path must start with the configured prefix
//
// Rust concepts:
// - Newtype pattern: CanonicalUrl wraps url::Url so a raw Url can't sneak
//   into the frontier without going through normalization
// - Option<T>: malformed links become None instead of errors
// =============================================================================

use std::fmt;

use serde::{Serialize, Serializer};
use url::Url;

/// An absolute URL with its fragment removed.
///
/// This is the identity of a page everywhere in the crawler: the visited set,
/// the pending set and the report all hold `CanonicalUrl`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Parses an absolute URL string and strips its fragment.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::from_url)
    }

    pub fn from_url(mut url: Url) -> Self {
        url.set_fragment(None);
        CanonicalUrl(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The host + path-prefix predicate that defines which pages we crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    domain: String,
    path_prefix: String,
}

impl Scope {
    pub fn new(domain: impl Into<String>, path_prefix: impl Into<String>) -> Self {
        Scope {
            domain: domain.into(),
            path_prefix: path_prefix.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// True iff the URL's host contains our domain AND its path starts with
    /// our prefix. URLs without a host (mailto:, data:, ...) are never in scope.
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.covers_host(url) && url.path().starts_with(&self.path_prefix)
    }

    /// The host half of `contains`: true iff the URL's host contains our
    /// domain, whatever its path.
    pub fn covers_host(&self, url: &CanonicalUrl) -> bool {
        url.as_url()
            .host_str()
            .map_or(false, |host| host.contains(&self.domain))
    }

    /// Resolves a raw link target found on `base` into a canonical URL.
    ///
    /// Resolution rules, in order:
    ///   "/docs/x"            -> https://{domain}/docs/x   (site-rooted path)
    ///   "https://a.com/x"    -> parsed as-is              (already absolute)
    ///   "../x", "x", "//h/x" -> joined onto `base`        (relative)
    ///
    /// The fragment is always stripped. Returns None for anything that does
    /// not produce a valid URL.
    pub fn normalize(&self, raw: &str, base: &CanonicalUrl) -> Option<CanonicalUrl> {
        let target = clean_target(raw)?;

        let resolved = if target.starts_with('/') && !target.starts_with("//") {
            Url::parse(&format!("https://{}{}", self.domain, target)).ok()?
        } else {
            match Url::parse(target) {
                Ok(url) => url,
                // No scheme: a relative reference, resolve it like a browser would
                Err(url::ParseError::RelativeUrlWithoutBase) => base.as_url().join(target).ok()?,
                Err(_) => return None,
            }
        };

        Some(CanonicalUrl::from_url(resolved))
    }
}

// Reduces a Markdown link target to the URL part.
//
// Examples:
//   "  /docs/a  "            -> "/docs/a"
//   "<docs/a b.md>"          -> "docs/a b.md"
//   "/docs/a \"Title\""      -> "/docs/a"
fn clean_target(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    let target = match trimmed.strip_prefix('<') {
        Some(rest) => rest.split('>').next().unwrap_or(rest).trim(),
        None => trimmed.split_whitespace().next().unwrap_or(""),
    };

    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}
