// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Sources, later ones win:
// 1. Built-in defaults (the NextDevKit Chinese documentation)
// 2. An optional TOML file (--config)
// 3. Command-line flags
//
// Example config.toml:
//
//   root_url = "https://nextdevkit.com/zh/docs"
//   domain = "nextdevkit.com"
//   path_prefix = "/zh/docs"
//   output_dir = "data"
//   delay_ms = 100
//
//   [fetch]
//   word_count_threshold = 10
//   exclude_external_links = true
//   remove_overlay_elements = true
//   timeout_secs = 30
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fetch::FetchOptions;
use crate::links::{CanonicalUrl, Scope};

pub const DEFAULT_ROOT_URL: &str = "https://nextdevkit.com/zh/docs";
pub const DEFAULT_DOMAIN: &str = "nextdevkit.com";
pub const DEFAULT_PATH_PREFIX: &str = "/zh/docs";
pub const DEFAULT_OUTPUT_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Where the crawl starts
    pub root_url: String,
    /// Hosts containing this string are in scope
    pub domain: String,
    /// Paths starting with this are in scope
    pub path_prefix: String,
    /// Directory the Markdown files are written to
    pub output_dir: PathBuf,
    /// Pause between pages, in milliseconds (0 = none)
    pub delay_ms: u64,
    pub fetch: FetchOptions,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            root_url: DEFAULT_ROOT_URL.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay_ms: 100,
            fetch: FetchOptions::default(),
        }
    }
}

impl CrawlConfig {
    /// Loads the config file if one is given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The root URL in canonical form.
    pub fn root(&self) -> Result<CanonicalUrl, ConfigError> {
        CanonicalUrl::parse(&self.root_url).map_err(|source| ConfigError::InvalidRootUrl {
            url: self.root_url.clone(),
            source,
        })
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.domain.clone(), self.path_prefix.clone())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
