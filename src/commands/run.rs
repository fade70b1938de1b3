//! Full crawl command: search collection followed by per-product detail
//! collection, persisted as one merged dataset.

use crate::browser::Browser;
use crate::config::Config;
use crate::store::ResultStore;
use crate::tokopedia::{ProductCollector, ProductRecord, SearchCollector};
use anyhow::{Context, Result};
use rand::RngExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Runs the configured search URLs end to end.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    /// Creates a new run command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Crawls every configured search URL, visits each collected product,
    /// and saves the merged records. Returns the number of records saved.
    pub async fn execute(&self) -> Result<usize> {
        if self.config.search_urls.is_empty() {
            anyhow::bail!("No search URLs configured; set `search_urls` in the config file");
        }

        let browser =
            Browser::launch(&self.config).await.context("Failed to start browser session")?;

        let result = self.crawl(&browser).await;
        browser.quit().await?;
        result
    }

    async fn crawl(&self, browser: &Browser) -> Result<usize> {
        let search = SearchCollector::new(browser, &self.config);
        let products = ProductCollector::new(browser, &self.config);

        let mut records: Vec<ProductRecord> = Vec::new();
        for url in &self.config.search_urls {
            let summaries = match search.collect(url).await {
                Ok(summaries) => summaries,
                Err(error) => {
                    warn!("Search failed for {}: {:#}", url, error);
                    continue;
                }
            };
            info!(count = summaries.len(), "visiting product pages");

            for summary in summaries {
                let Some(product_url) = summary.product_url.clone() else {
                    warn!(title = %summary.title, "summary has no product URL, skipping");
                    continue;
                };

                self.pause_between_products().await;

                match products.collect(&product_url).await {
                    Ok(detail) => records.push(ProductRecord { summary, detail }),
                    Err(error) => warn!("Skipping {}: {:#}", product_url, error),
                }
            }
        }

        if records.is_empty() {
            info!("Nothing collected, no output written");
            return Ok(0);
        }

        let store = ResultStore::new(&self.config.output_dir);
        let (json_path, csv_path) = store.save_detailed(&records)?;
        info!(
            "Saved {} records to {} and {}",
            records.len(),
            json_path.display(),
            csv_path.display()
        );

        Ok(records.len())
    }

    /// Delay with jitter so page visits do not arrive on a fixed cadence.
    async fn pause_between_products(&self) {
        let jitter = if self.config.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.config.delay_jitter_ms)
        } else {
            0
        };
        sleep(Duration::from_millis(self.config.product_delay_ms + jitter)).await;
    }
}
