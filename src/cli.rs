// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag is optional. Running `docs-archiver` with no arguments crawls the
// built-in target into ./data. Flags override the config file, which
// overrides the built-in defaults.
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::CrawlConfig;

#[derive(Parser, Debug)]
#[command(
    name = "docs-archiver",
    version,
    about = "Crawl a documentation site and save every page as Markdown",
    long_about = "docs-archiver starts at one documentation page, follows every link that stays \
                  inside the same domain and path prefix, and saves each page as a Markdown \
                  file named after its URL path."
)]
pub struct Cli {
    /// TOML config file with any of: root_url, domain, path_prefix, output_dir, delay_ms, [fetch]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Page to start crawling from
    #[arg(long, value_name = "URL")]
    pub root_url: Option<String>,

    /// Only hosts containing this string are crawled
    #[arg(long)]
    pub domain: Option<String>,

    /// Only paths starting with this prefix are crawled
    #[arg(long, value_name = "PREFIX")]
    pub path_prefix: Option<String>,

    /// Directory to write the Markdown files into
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Pause between pages, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Print the crawl report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: CrawlConfig) -> CrawlConfig {
        if let Some(root_url) = &self.root_url {
            config.root_url = root_url.clone();
        }
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }
        if let Some(prefix) = &self.path_prefix {
            config.path_prefix = prefix.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        config
    }
}
