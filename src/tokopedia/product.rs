//! Product-page collection: description, seller info, images, variant axes
//! and their resolved per-combination prices, plus reviews.

use crate::browser::Browser;
use crate::config::Config;
use crate::text;
use crate::tokopedia::models::{CollectionLink, DetailImages, ProductDetail, VariantAxis};
use crate::tokopedia::page::LivePage;
use crate::tokopedia::reviews::ReviewCollector;
use crate::tokopedia::selectors::product;
use crate::tokopedia::variants::VariantResolver;
use anyhow::Result;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Bounded wait for the description block, the signal that the page's main
/// content has rendered.
const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Poll interval while waiting on the page.
const POLL_MS: u64 = 250;

/// Collects full details from Tokopedia product pages.
pub struct ProductCollector<'a> {
    browser: &'a Browser,
    config: &'a Config,
}

impl<'a> ProductCollector<'a> {
    pub fn new(browser: &'a Browser, config: &'a Config) -> Self {
        Self { browser, config }
    }

    /// Opens `url` and extracts everything the page shows. Individual
    /// missing sections degrade to defaults rather than failing the whole
    /// product.
    pub async fn collect(&self, url: &str) -> Result<ProductDetail> {
        info!("collecting product details from {}", url);
        self.browser.goto(url).await?;

        if !self.wait_for_page().await {
            warn!("description block never appeared, extracting what rendered");
        }

        let mut detail = ProductDetail::default();

        detail.seller_rating = self.seller_rating().await;
        detail.delivery_origin = self.delivery_origin().await;
        self.fill_info_list(&mut detail).await;

        detail.variants = self.scan_axes().await;
        if detail.variants.is_empty() {
            debug!("product has no variant axes");
        } else {
            let page = LivePage::new(self.browser.driver());
            let resolver = VariantResolver::new(&page);
            detail.available_variant_details = resolver.resolve(&detail.variants).await;
        }

        detail.description = self.description().await;
        detail.detail_images = self.detail_images().await;

        let reviews = ReviewCollector::new(self.browser, self.config.max_review_pages);
        detail.reviews = reviews.collect().await;

        Ok(detail)
    }

    async fn wait_for_page(&self) -> bool {
        let driver = self.browser.driver();
        let start = std::time::Instant::now();
        while start.elapsed() < PAGE_TIMEOUT {
            if driver.find(By::Css(product::DESCRIPTION)).await.is_ok() {
                return true;
            }
            sleep(Duration::from_millis(POLL_MS)).await;
        }
        false
    }

    /// Reads the advertised variant axes from their headers and chip
    /// groups. Chips are listed as advertised here; live availability is
    /// the resolver's job.
    async fn scan_axes(&self) -> Vec<VariantAxis> {
        let driver = self.browser.driver();
        let headers = match driver.find_all(By::XPath(product::VARIANT_HEADERS)).await {
            Ok(headers) => headers,
            Err(_) => return Vec::new(),
        };

        let mut axes = Vec::new();
        for header in headers {
            let label = header.text().await.unwrap_or_default();
            let Some(name) = text::parse_axis_label(&label) else {
                debug!(label = %label.trim(), "skipping unparseable variant header");
                continue;
            };

            let Ok(group) = header.find(By::XPath(product::VARIANT_GROUP)).await else {
                debug!(axis = %name, "variant header without chip group");
                continue;
            };
            let Ok(buttons) = group.find_all(By::Tag("button")).await else {
                continue;
            };

            let mut options = Vec::with_capacity(buttons.len());
            for button in buttons {
                let raw = button.text().await.unwrap_or_default();
                let option = raw.lines().next().unwrap_or("").trim();
                if !option.is_empty() && !option.starts_with("http") {
                    options.push(option.to_string());
                }
            }

            if options.is_empty() {
                debug!(axis = %name, "axis has no readable options");
                continue;
            }
            debug!(axis = %name, count = options.len(), "found variant axis");
            axes.push(VariantAxis::new(name, options));
        }

        axes
    }

    async fn seller_rating(&self) -> f64 {
        let driver = self.browser.driver();
        match driver.find(By::XPath(product::SELLER_RATING)).await {
            Ok(element) => {
                let raw = element.text().await.unwrap_or_default();
                text::clean_rating(&raw)
            }
            Err(_) => 0.0,
        }
    }

    async fn delivery_origin(&self) -> String {
        let driver = self.browser.driver();
        let Ok(heading) = driver.find(By::XPath(product::DELIVERY_ORIGIN)).await else {
            return String::new();
        };
        match heading.find(By::Tag("b")).await {
            Ok(city) => city.text().await.unwrap_or_default().trim().to_string(),
            Err(_) => String::new(),
        }
    }

    /// Parses the condition / min-order / etalase info list.
    async fn fill_info_list(&self, detail: &mut ProductDetail) {
        let driver = self.browser.driver();
        let Ok(list) = driver.find(By::Css(product::INFO_LIST)).await else {
            return;
        };
        let Ok(items) = list.find_all(By::Tag("li")).await else {
            return;
        };

        for item in items {
            let raw = item.text().await.unwrap_or_default();
            let line = raw.trim();
            let lower = line.to_lowercase();

            if lower.starts_with("kondisi") {
                if let Some(value) = info_value(line) {
                    detail.condition = value;
                }
            } else if lower.starts_with("min. pemesanan") {
                detail.min_order = text::first_integer(line).unwrap_or(1);
            } else if lower.starts_with("etalase") {
                if let Ok(anchor) = item.find(By::Tag("a")).await {
                    let label = anchor.text().await.unwrap_or_default().trim().to_string();
                    let href = anchor.attr("href").await.ok().flatten().unwrap_or_default();
                    if !label.is_empty() && !href.is_empty() {
                        detail.collection.push(CollectionLink {
                            text: label,
                            url: text::ensure_absolute(&href, &self.config.base_url),
                        });
                    }
                }
            }
        }
    }

    /// Full description text, expanding the "Lihat Selengkapnya" truncation
    /// when present.
    async fn description(&self) -> String {
        let driver = self.browser.driver();

        // Bring the description into view before looking for the expander
        self.browser.scroll_by(400).await;
        sleep(Duration::from_millis(300)).await;

        if let Ok(expand) = driver.find(By::XPath(product::DESCRIPTION_EXPAND)).await {
            if expand.click().await.is_err() {
                debug!("description expand click failed, keeping truncated text");
            } else {
                sleep(Duration::from_millis(300)).await;
            }
        }

        let Ok(block) = driver.find(By::Css(product::DESCRIPTION)).await else {
            return String::new();
        };
        match block.inner_html().await {
            Ok(html) => text::html_to_text(&html).trim().to_string(),
            Err(_) => block.text().await.unwrap_or_default().trim().to_string(),
        }
    }

    /// Gallery thumbnails plus enlarged previews derived from the CDN cache
    /// path each thumbnail uses.
    async fn detail_images(&self) -> DetailImages {
        let driver = self.browser.driver();
        let mut images = DetailImages::default();

        let Ok(thumbnails) = driver.find_all(By::Css(product::IMAGE_THUMBNAILS)).await else {
            return images;
        };

        for thumbnail in thumbnails {
            let Ok(Some(src)) = thumbnail.attr("src").await else {
                continue;
            };
            if !text::is_valid_url(&src) {
                continue;
            }
            images.preview.push(src.replace("/cache/200/", "/cache/500-square/"));
            images.thumbnail.push(src);
        }

        debug!(count = images.thumbnail.len(), "collected gallery images");
        images
    }
}

/// Value part of a "Label: value" info line, keeping the original casing.
/// Splitting on the original string sidesteps byte-offset drift between a
/// line and its lowercased form on non-ASCII text.
fn info_value(line: &str) -> Option<String> {
    let (_, value) = line.split_once(':')?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
