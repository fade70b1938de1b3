//! Live product-page access behind the [`PageProbe`] trait.
//!
//! The variant resolver never talks to the WebDriver directly; it goes
//! through this trait so tests can script a page with conditional option
//! availability instead of standing up a browser.

use crate::tokopedia::selectors::product;
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Pause after each click so the page's own re-render catches up.
const SETTLE_MS: u64 = 100;

/// Poll interval for bounded element waits.
const POLL_MS: u64 = 250;

/// Capabilities the variant resolver needs from the rendered product page.
///
/// Every operation is best-effort: lookup failures surface as `None`, empty
/// lists, or `false`, never as errors. The page's selected-chip state is the
/// one shared mutable resource; callers own the single live selection and
/// must not interleave resolutions on the same page.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Trimmed text of the first element matching `selector`, if any.
    async fn text_of(&self, selector: &str) -> Option<String>;

    /// Blocks until `selector` is present or `timeout` elapses.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool;

    /// Labels of the axis's chips still orderable under the current
    /// selection. Empty when the axis header or chip group is missing.
    async fn enabled_options(&self, axis: &str) -> Vec<String>;

    /// Clicks the chip whose label equals or contains `option`. Retries a
    /// failed click once through a script-invoked click.
    async fn select_option(&self, axis: &str, option: &str) -> bool;

    /// Lets asynchronous rendering catch up after a click.
    async fn settle(&self);
}

/// [`PageProbe`] implementation over a live WebDriver session pointed at a
/// product page.
pub struct LivePage<'a> {
    driver: &'a WebDriver,
}

impl<'a> LivePage<'a> {
    pub fn new(driver: &'a WebDriver) -> Self {
        Self { driver }
    }

    /// Finds the chip group for an axis by matching its "pilih <axis>:"
    /// header, then stepping to the sibling chip container.
    async fn axis_group(&self, axis: &str) -> Option<WebElement> {
        let headers = self
            .driver
            .find_all(By::XPath(product::VARIANT_HEADERS))
            .await
            .ok()?;

        let needle = format!("pilih {}", axis.to_lowercase());
        for header in headers {
            let label = header.text().await.unwrap_or_default();
            if !label.trim().to_lowercase().contains(&needle) {
                continue;
            }
            match header.find(By::XPath(product::VARIANT_GROUP)).await {
                Ok(group) => return Some(group),
                Err(_) => {
                    debug!(axis, "chip group missing next to variant header");
                    return None;
                }
            }
        }

        debug!(axis, "variant header not found");
        None
    }

    async fn scroll_to(&self, element: &WebElement) {
        if let Ok(handle) = element.to_json() {
            let _ = self
                .driver
                .execute("arguments[0].scrollIntoView({block: 'center'});", vec![handle])
                .await;
        }
        sleep(Duration::from_millis(200)).await;
    }

    /// Script-invoked click, used when the regular click is intercepted.
    async fn script_click(&self, element: &WebElement) -> bool {
        match element.to_json() {
            Ok(handle) => self
                .driver
                .execute("arguments[0].click();", vec![handle])
                .await
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl PageProbe for LivePage<'_> {
    async fn text_of(&self, selector: &str) -> Option<String> {
        let element = self.driver.find(By::Css(selector)).await.ok()?;
        let text = element.text().await.ok()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if self.driver.find(By::Css(selector)).await.is_ok() {
                return true;
            }
            sleep(Duration::from_millis(POLL_MS)).await;
        }
        false
    }

    async fn enabled_options(&self, axis: &str) -> Vec<String> {
        let Some(group) = self.axis_group(axis).await else {
            return Vec::new();
        };

        let chips = match group.find_all(By::Css(product::VARIANT_ACTIVE_CHIPS)).await {
            Ok(chips) => chips,
            Err(_) => return Vec::new(),
        };

        let mut options = Vec::with_capacity(chips.len());
        for chip in chips {
            let raw = chip.text().await.unwrap_or_default();
            let label = raw.lines().next().unwrap_or("").trim();
            if !label.is_empty() && !label.starts_with("http") {
                options.push(label.to_string());
            }
        }

        debug!(axis, ?options, "enabled options");
        options
    }

    async fn select_option(&self, axis: &str, option: &str) -> bool {
        let Some(group) = self.axis_group(axis).await else {
            return false;
        };

        let buttons = match group.find_all(By::Tag("button")).await {
            Ok(buttons) => buttons,
            Err(_) => return false,
        };

        for button in buttons {
            let label = button.text().await.unwrap_or_default();
            let label = label.trim();
            if label != option && !label.contains(option) {
                continue;
            }

            self.scroll_to(&button).await;
            if button.click().await.is_ok() {
                return true;
            }
            if self.script_click(&button).await {
                return true;
            }
            warn!(axis, option, "both direct and script click failed");
            return false;
        }

        warn!(axis, option, "no chip matched the option label");
        false
    }

    async fn settle(&self) {
        sleep(Duration::from_millis(SETTLE_MS)).await;
    }
}
