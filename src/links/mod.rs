// src/links/mod.rs
// =============================================================================
// Link handling: everything between "a string that looked like a link" and
// "a URL the frontier may accept".
//
// Submodules:
// - normalize: CanonicalUrl, Scope (resolution + admission filter)
// - extract: finds [label](target) links in rendered page text
// =============================================================================

mod extract;
mod normalize;

pub use extract::{extract_links, link_spans};
pub use normalize::{CanonicalUrl, Scope};
