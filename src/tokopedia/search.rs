//! Search-results collection: walking the result grid page by page and
//! extracting one [`ProductSummary`] per card.

use crate::browser::Browser;
use crate::config::Config;
use crate::text;
use crate::tokopedia::models::ProductSummary;
use crate::tokopedia::selectors::search;
use anyhow::Result;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Bounded wait for the results grid to render after navigation.
const RESULTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting on the grid.
const POLL_MS: u64 = 250;

/// Pause between scroll steps so lazy-loaded cards have time to appear.
const SCROLL_STEP_PAUSE: Duration = Duration::from_millis(100);

/// Collects product summaries from Tokopedia search-result pages.
pub struct SearchCollector<'a> {
    browser: &'a Browser,
    config: &'a Config,
}

impl<'a> SearchCollector<'a> {
    pub fn new(browser: &'a Browser, config: &'a Config) -> Self {
        Self { browser, config }
    }

    /// Walks up to `max_pages` of results under `url`, stopping early when
    /// `max_products` summaries have been collected or a page comes back
    /// without cards.
    pub async fn collect(&self, url: &str) -> Result<Vec<ProductSummary>> {
        let mut summaries = Vec::new();
        let mut label = String::new();

        for page in 1..=self.config.max_pages {
            if summaries.len() >= self.config.max_products {
                break;
            }

            let page_url = page_url(url, page);
            info!(page, "collecting search results from {}", page_url);

            self.browser.goto(&page_url).await?;
            if !self.wait_for_results().await {
                warn!(page, "results grid never appeared, stopping pagination");
                break;
            }

            if page == 1 {
                label = self.read_search_label(url).await;
                self.log_active_filters().await;
            }

            self.browser
                .scroll_page(self.config.scroll_steps, SCROLL_STEP_PAUSE)
                .await;

            let cards = self.find_cards().await;
            if cards.is_empty() {
                warn!(page, "no product cards found, stopping pagination");
                break;
            }
            debug!(page, cards = cards.len(), "extracting cards");

            for card in cards {
                if summaries.len() >= self.config.max_products {
                    break;
                }
                if let Some(summary) = self.extract_card(&card, &label).await {
                    summaries.push(summary);
                }
            }
        }

        info!(count = summaries.len(), "search collection finished");
        Ok(summaries)
    }

    async fn wait_for_results(&self) -> bool {
        let driver = self.browser.driver();
        let start = std::time::Instant::now();
        while start.elapsed() < RESULTS_TIMEOUT {
            if driver.find(By::Css(search::RESULTS_READY)).await.is_ok() {
                return true;
            }
            sleep(Duration::from_millis(POLL_MS)).await;
        }
        false
    }

    /// Human-readable query label, taken from the "you searched for" banner
    /// with the request URL's `q=` parameter as fallback.
    async fn read_search_label(&self, requested_url: &str) -> String {
        let driver = self.browser.driver();

        if let Ok(element) = driver.find(By::Css(search::SEARCH_INFO_QUERY)).await {
            if let Ok(raw) = element.text().await {
                let label = clean_search_label(&raw);
                if !label.is_empty() {
                    return label;
                }
            }
        }

        query_from_url(requested_url)
            .map(|q| clean_search_label(&q))
            .unwrap_or_default()
    }

    async fn log_active_filters(&self) {
        let driver = self.browser.driver();
        let Ok(chips) = driver.find_all(By::Css(search::FILTER_CHIP)).await else {
            return;
        };

        let mut active = Vec::new();
        for chip in chips {
            if let Ok(label) = chip.text().await {
                let label = label.trim().to_string();
                if !label.is_empty() {
                    active.push(label);
                }
            }
        }
        if !active.is_empty() {
            info!(filters = ?active, "active search filters");
        }
    }

    async fn find_cards(&self) -> Vec<WebElement> {
        let driver = self.browser.driver();
        for selector in search::PRODUCT_CARD {
            match driver.find_all(By::Css(*selector)).await {
                Ok(cards) if !cards.is_empty() => {
                    debug!(selector, count = cards.len(), "card selector matched");
                    return cards;
                }
                _ => continue,
            }
        }
        Vec::new()
    }

    /// Extracts one summary from a card. Cards without a usable title
    /// (empty shells render an "N/A" placeholder) are skipped.
    async fn extract_card(&self, card: &WebElement, label: &str) -> Option<ProductSummary> {
        let title = first_text(card, search::TITLE).await?;
        if !is_usable_title(&title) {
            return None;
        }

        let displayed_price_final = first_text(card, search::PRICE_FINAL)
            .await
            .and_then(|t| text::clean_price(&t))
            .unwrap_or(0);

        let displayed_price_original = first_text(card, search::PRICE_ORIGINAL)
            .await
            .and_then(|t| text::clean_price(&t))
            .unwrap_or(displayed_price_final);

        let discount = first_text(card, search::DISCOUNT)
            .await
            .and_then(|t| text::first_integer(&t))
            .unwrap_or(0);

        let image_url = self.card_image(card).await;

        let (seller_name, location) = self.seller_block(card).await;

        let product_rating = first_text(card, search::RATING)
            .await
            .map(|t| text::clean_rating(&t))
            .filter(|r| *r > 0.0);

        let sold_count = first_text(card, search::SOLD_COUNT)
            .await
            .and_then(|t| text::clean_sold_count(&t));

        let product_url = self.card_link(card).await;

        Some(ProductSummary {
            title,
            label: label.to_string(),
            displayed_price_final,
            displayed_price_original,
            discount,
            image_url,
            seller_name,
            location,
            product_rating,
            sold_count,
            product_url,
        })
    }

    async fn card_image(&self, card: &WebElement) -> Option<String> {
        for selector in search::IMAGE {
            let Ok(img) = card.find(By::Css(*selector)).await else {
                continue;
            };
            for attribute in ["src", "data-src"] {
                if let Ok(Some(src)) = img.attr(attribute).await {
                    if text::is_valid_url(&src) {
                        return Some(src);
                    }
                }
            }
        }
        None
    }

    /// The seller block renders its name and location as consecutive text
    /// lines; order is stable even when the markup classes rotate.
    async fn seller_block(&self, card: &WebElement) -> (Option<String>, Option<String>) {
        let Ok(block) = card.find(By::Css(search::SELLER_BLOCK)).await else {
            return (None, None);
        };
        let Ok(raw) = block.text().await else {
            return (None, None);
        };

        let mut lines = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());
        let seller = lines.next().map(str::to_string);
        let location = lines.next().map(str::to_string);
        (seller, location)
    }

    async fn card_link(&self, card: &WebElement) -> Option<String> {
        let anchor = match card.find(By::Tag("a")).await {
            Ok(anchor) => anchor,
            // Some layouts wrap the card itself in the anchor
            Err(_) => card.clone(),
        };
        let href = anchor.attr("href").await.ok().flatten()?;
        let absolute = text::ensure_absolute(&href, &self.config.base_url);
        text::is_valid_url(&absolute).then_some(absolute)
    }
}

/// A card title is usable unless it is the "N/A" placeholder rendered by
/// empty card shells. Short titles are real products and are kept.
fn is_usable_title(title: &str) -> bool {
    !title.eq_ignore_ascii_case("n/a")
}

/// Results URL for a plain query string.
pub fn search_url(base_url: &str, query: &str) -> String {
    format!(
        "{}/search?st=product&q={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// URL for a given results page; page 1 is the URL as given.
fn page_url(url: &str, page: u32) -> String {
    if page <= 1 {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}page={page}")
}

/// Normalizes the banner/query text into a label: quotes and punctuation
/// dropped, words title-cased.
fn clean_search_label(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// The decoded `q` query parameter, if the URL has one.
fn query_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

/// First non-empty trimmed text across a fallback selector list.
async fn first_text(scope: &WebElement, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let Ok(element) = scope.find(By::Css(*selector)).await else {
            continue;
        };
        if let Ok(raw) = element.text().await {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
