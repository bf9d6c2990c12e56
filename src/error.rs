// src/error.rs
// =============================================================================
// Fatal errors of a crawl run.
//
// Per-page problems (404s, timeouts, empty pages) are NOT here: the engine
// records them in the report and keeps going. What ends up in CrawlError
// stops the run.
// =============================================================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// Saving a page failed. Not recovered: a full disk or a read-only
    /// output directory would fail every following page too.
    #[error("failed to write artifact {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid root URL {url:?}: {source}")]
    InvalidRootUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
