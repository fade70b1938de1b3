//! Search command implementation.

use crate::browser::Browser;
use crate::config::Config;
use crate::store::ResultStore;
use crate::text;
use crate::tokopedia::search::search_url;
use crate::tokopedia::SearchCollector;
use anyhow::{Context, Result};
use tracing::info;

/// Collects product summaries from one search URL and persists them.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the search collection and returns the number of products saved.
    /// `target` is either a results URL or a plain query string.
    pub async fn execute(&self, target: &str) -> Result<usize> {
        let url = if text::is_valid_url(target) {
            target.to_string()
        } else {
            search_url(&self.config.base_url, target)
        };

        let browser =
            Browser::launch(&self.config).await.context("Failed to start browser session")?;

        let result = self.collect_and_save(&browser, &url).await;
        browser.quit().await?;
        result
    }

    async fn collect_and_save(&self, browser: &Browser, url: &str) -> Result<usize> {
        let collector = SearchCollector::new(browser, &self.config);
        let summaries = collector.collect(url).await?;

        if summaries.is_empty() {
            info!("No products collected, nothing to save");
            return Ok(0);
        }

        let label = summaries.first().map(|s| s.label.clone()).unwrap_or_default();
        let slug = text::filename_safe(&label, 40).to_lowercase();

        let store = ResultStore::new(&self.config.output_dir);
        let stamp = crate::store::timestamp();
        store.save_json(&summaries, &format!("tokopedia_search_{slug}_{stamp}.json"))?;
        store.save_csv(&summaries, &format!("tokopedia_search_{slug}_{stamp}.csv"))?;

        Ok(summaries.len())
    }
}
