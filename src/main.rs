// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the effective configuration (defaults <- config file <- flags)
// 3. Crawl the documentation subtree, saving every page as Markdown
// 4. Print a summary (or the JSON report)
// 5. Exit with proper code (0 = crawl finished, 2 = fatal error)
//
// A crawl where some pages failed still exits with 0: failed pages are part
// of the report, not a reason to stop.
// =============================================================================

mod archive;
mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod links;
mod logging;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use archive::FsArtifactWriter;
use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlReport, Crawler};
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let config = cli.apply(CrawlConfig::load(cli.config.as_deref())?);

    if cli.print_config {
        print!("{}", config.to_toml().context("failed to render config")?);
        return Ok(0);
    }

    let root = config.root()?;
    let fetcher = HttpFetcher::new(&config.fetch, config.scope()).context("failed to build HTTP client")?;
    let writer = FsArtifactWriter::new(&config.output_dir);

    if !cli.json {
        println!("{}", "=".repeat(60));
        println!("📚 Archiving documentation: {}", root);
        println!("{}", "=".repeat(60));
    }

    let crawler = Crawler::new(config.scope(), fetcher, writer)
        .with_options(config.fetch.clone())
        .with_delay(config.delay());

    let report = crawler
        .run(root)
        .await
        .with_context(|| format!("crawl aborted, output in {}", config.output_dir.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &config.output_dir);
    }

    Ok(0)
}

fn print_summary(report: &CrawlReport, output_dir: &Path) {
    println!();
    println!("{}", "=".repeat(60));
    println!("✅ Crawl finished: {} page(s) processed", report.pages_processed);
    println!("   💾 Saved: {}", report.saved.len());
    println!("   ❌ Failed: {}", report.failed.len());
    if !report.collisions.is_empty() {
        println!("   ⚠️  Overwritten (same file name): {}", report.collisions.len());
    }
    println!("   📁 Output: {}", output_dir.display());
    println!("{}", "=".repeat(60));

    if !report.failed.is_empty() {
        println!();
        println!("{:<70} REASON", "FAILED URL");
        for failed in &report.failed {
            let url = failed.url.to_string();
            // Truncate URL if too long for display
            let url_display = if url.chars().count() > 67 {
                format!("{}...", url.chars().take(67).collect::<String>())
            } else {
                url
            };
            println!("{:<70} {}", url_display, failed.reason);
        }
    }
}
