//! Product detail command implementation.

use crate::browser::Browser;
use crate::config::Config;
use crate::store::ResultStore;
use crate::text;
use crate::tokopedia::{ProductCollector, ProductDetail};
use anyhow::{Context, Result};
use rand::RngExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Collects full details for one or more product page URLs.
pub struct ProductCommand {
    config: Config,
}

impl ProductCommand {
    /// Creates a new product command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Collects details for each URL and persists them. Returns the number
    /// of products collected.
    pub async fn execute(&self, urls: &[String]) -> Result<usize> {
        for url in urls {
            if !text::is_valid_url(url) {
                anyhow::bail!("Invalid product URL: '{}'", url);
            }
        }

        let browser =
            Browser::launch(&self.config).await.context("Failed to start browser session")?;

        let result = self.collect_and_save(&browser, urls).await;
        browser.quit().await?;
        result
    }

    async fn collect_and_save(&self, browser: &Browser, urls: &[String]) -> Result<usize> {
        let collector = ProductCollector::new(browser, &self.config);

        let mut details: Vec<ProductDetail> = Vec::new();
        for (idx, url) in urls.iter().enumerate() {
            if idx > 0 {
                self.pause_between_products().await;
            }
            match collector.collect(url).await {
                Ok(detail) => details.push(detail),
                Err(error) => warn!("Skipping {}: {:#}", url, error),
            }
        }

        if details.is_empty() {
            info!("No products collected, nothing to save");
            return Ok(0);
        }

        let store = ResultStore::new(&self.config.output_dir);
        let stamp = crate::store::timestamp();
        store.save_json(&details, &format!("tokopedia_product_details_{stamp}.json"))?;

        Ok(details.len())
    }

    async fn pause_between_products(&self) {
        let jitter = if self.config.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.config.delay_jitter_ms)
        } else {
            0
        };
        sleep(Duration::from_millis(self.config.product_delay_ms + jitter)).await;
    }
}
