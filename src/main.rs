//! toko-crawler - Browser-driven Tokopedia product crawler
//!
//! Collects search results, product details, per-variant prices, and
//! reviews through a real Chrome session.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toko_crawler::commands::{ProductCommand, RunCommand, SearchCommand};
use toko_crawler::config::Config;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "toko-crawler",
    version,
    about = "Browser-driven Tokopedia product crawler",
    long_about = "Drives a Chrome session over WebDriver to collect Tokopedia search \
                  results, product details, per-variant prices, and reviews."
)]
struct Cli {
    /// WebDriver server URL
    #[arg(long, global = true, env = "TOKO_WEBDRIVER")]
    webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    headed: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for JSON/CSV results
    #[arg(short, long, global = true)]
    output_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect product summaries from a search URL
    #[command(alias = "s")]
    Search {
        /// Search query or full results URL
        query: String,

        /// Maximum number of products to collect
        #[arg(short, long, default_value = "50")]
        max: usize,

        /// Maximum number of result pages to walk
        #[arg(short, long, default_value = "2")]
        pages: u32,
    },

    /// Collect full details from product page URLs
    #[command(alias = "p")]
    Product {
        /// Product page URL(s)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum review pages per product
        #[arg(long, default_value = "2")]
        review_pages: u32,
    },

    /// Run the full crawl over the configured search URLs
    #[command(alias = "r")]
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(webdriver_url) = cli.webdriver_url {
        config.webdriver_url = webdriver_url;
    }
    if cli.headed {
        config.headless = false;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    match cli.command {
        Commands::Search { query, max, pages } => {
            config.max_products = max;
            config.max_pages = pages;

            let cmd = SearchCommand::new(config);
            let count = cmd.execute(&query).await?;
            println!("Collected {} products", count);
        }

        Commands::Product { urls, review_pages } => {
            config.max_review_pages = review_pages;

            let cmd = ProductCommand::new(config);
            let count = cmd.execute(&urls).await?;
            println!("Collected {} products", count);
        }

        Commands::Run => {
            let cmd = RunCommand::new(config);
            let count = cmd.execute().await?;
            println!("Saved {} product records", count);
        }
    }

    Ok(())
}
