//! Review collection from the product page's review section.

use crate::browser::Browser;
use crate::text;
use crate::tokopedia::models::Review;
use crate::tokopedia::selectors::reviews;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Bounded wait for review articles to render after scrolling/paging.
const REVIEWS_TIMEOUT: Duration = Duration::from_secs(8);

/// Poll interval while waiting on articles.
const POLL_MS: u64 = 250;

/// Pause between viewport scrolls that bring the review section into view.
const SCROLL_PAUSE: Duration = Duration::from_millis(400);

/// Collects customer reviews from an already-open product page.
pub struct ReviewCollector<'a> {
    browser: &'a Browser,
    max_pages: u32,
}

impl<'a> ReviewCollector<'a> {
    pub fn new(browser: &'a Browser, max_pages: u32) -> Self {
        Self { browser, max_pages }
    }

    /// Scrolls down to the review section and walks up to `max_pages` of
    /// reviews. A page without articles ends the walk; a missing review
    /// section yields an empty list.
    pub async fn collect(&self) -> Vec<Review> {
        self.browser.scroll_by_viewport(5, SCROLL_PAUSE).await;

        if !self.wait_for_articles().await {
            debug!("no review section on this page");
            return Vec::new();
        }

        let mut reviews = Vec::new();
        for page in 1..=self.max_pages {
            let articles = match self
                .browser
                .driver()
                .find_all(By::XPath(reviews::ARTICLE))
                .await
            {
                Ok(articles) if !articles.is_empty() => articles,
                _ => {
                    debug!(page, "no review articles, stopping");
                    break;
                }
            };

            debug!(page, count = articles.len(), "extracting reviews");
            for article in &articles {
                reviews.push(self.extract_review(article).await);
            }

            if page < self.max_pages && !self.next_page().await {
                break;
            }
        }

        debug!(count = reviews.len(), "review collection finished");
        reviews
    }

    async fn wait_for_articles(&self) -> bool {
        let driver = self.browser.driver();
        let start = std::time::Instant::now();
        while start.elapsed() < REVIEWS_TIMEOUT {
            if driver.find(By::XPath(reviews::ARTICLE)).await.is_ok() {
                return true;
            }
            sleep(Duration::from_millis(POLL_MS)).await;
        }
        false
    }

    /// Extracts one review. Every field is optional on the page; the text
    /// body falls back to empty.
    async fn extract_review(&self, article: &WebElement) -> Review {
        let user_name = element_text(article, reviews::USER_NAME).await;

        let variant = element_text(article, reviews::VARIANT)
            .await
            .map(|v| v.trim_start_matches("Varian:").trim().to_string())
            .filter(|v| !v.is_empty());

        let rating = match article.find(By::XPath(reviews::STAR_RATING)).await {
            Ok(star) => star
                .attr("aria-label")
                .await
                .ok()
                .flatten()
                .and_then(|aria| text::rating_from_aria(&aria)),
            Err(_) => None,
        };

        let time_ago = element_text(article, reviews::TIME_AGO).await;

        // Truncated reviews hide the full text behind a "Selengkapnya" button
        if let Ok(expand) = article.find(By::XPath(reviews::EXPAND)).await {
            if expand.click().await.is_err() {
                debug!("review expand click failed, keeping truncated text");
            }
        }

        let review_text = match article.find(By::XPath(reviews::BODY)).await {
            Ok(body) => match body.inner_html().await {
                Ok(html) => text::html_to_text(&html),
                Err(_) => body.text().await.unwrap_or_default(),
            },
            Err(_) => String::new(),
        };

        let image_url = match article.find(By::XPath(reviews::PHOTO)).await {
            Ok(photo) => photo.attr("src").await.ok().flatten(),
            Err(_) => None,
        };

        Review {
            user_name,
            variant,
            rating,
            time_ago,
            text: review_text.trim().to_string(),
            image_url,
        }
    }

    /// Clicks through to the next review page. Returns `false` when the
    /// pagination is missing, the next button is disabled, or the new page
    /// never renders.
    async fn next_page(&self) -> bool {
        let driver = self.browser.driver();

        let Ok(nav) = driver.find(By::Css(reviews::PAGINATION)).await else {
            debug!("review pagination not found");
            return false;
        };
        let Ok(next) = nav.find(By::Css(reviews::NEXT_PAGE)).await else {
            debug!("next-page button not found");
            return false;
        };

        if let Ok(Some(_)) = next.attr("disabled").await {
            debug!("next-page button disabled, last review page reached");
            return false;
        }

        if let Ok(handle) = next.to_json() {
            let _ = driver
                .execute("arguments[0].scrollIntoView({block: 'center'});", vec![handle])
                .await;
            sleep(Duration::from_millis(200)).await;
        }

        if next.click().await.is_err() {
            let clicked = match next.to_json() {
                Ok(handle) => driver
                    .execute("arguments[0].click();", vec![handle])
                    .await
                    .is_ok(),
                Err(_) => false,
            };
            if !clicked {
                warn!("next-page click failed");
                return false;
            }
        }

        self.wait_for_articles().await
    }
}

async fn element_text(scope: &WebElement, xpath: &str) -> Option<String> {
    let element = scope.find(By::XPath(xpath)).await.ok()?;
    let raw = element.text().await.ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
