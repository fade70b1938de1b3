//! WebDriver session bootstrap with the Chrome hardening flags the
//! marketplace tolerates, plus shared navigation/scroll helpers.

use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::json;
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tokio::time::sleep;
use tracing::{debug, info};

/// Chrome switches applied to every session. Mirrors what the site is known
/// to accept without tripping bot detection.
const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
    "--disable-gpu",
    "--enable-unsafe-webgl",
    "--enable-unsafe-swiftshader",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=Translate",
    "--disable-speech-api",
    "--disable-extensions",
    "--disable-plugins",
    "--disable-sync",
    "--disable-default-apps",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-application-cache",
    "--disable-component-update",
    "--disable-pinch",
    "--disable-translate",
    "--disable-webgl",
    "--disable-webgl2-compute-context",
];

/// Masks the `navigator.webdriver` flag WebDriver sets by default.
const MASK_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// A live browser session connected to a local WebDriver server.
pub struct Browser {
    driver: WebDriver,
}

impl Browser {
    /// Connects to the WebDriver server and opens a hardened Chrome session.
    pub async fn launch(config: &Config) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();

        if config.headless {
            caps.add_arg("--headless")?;
        }
        for arg in CHROME_ARGS {
            caps.add_arg(arg)?;
        }
        caps.add_arg(&format!("--user-agent={}", config.user_agent))?;

        caps.insert_browser_option(
            "excludeSwitches",
            json!(["enable-automation", "enable-logging"]),
        )?;
        caps.insert_browser_option("useAutomationExtension", json!(false))?;

        info!("Connecting to WebDriver at {}", config.webdriver_url);
        let driver = WebDriver::new(&config.webdriver_url, caps)
            .await
            .with_context(|| {
                format!("Failed to connect to WebDriver at {}", config.webdriver_url)
            })?;

        driver
            .execute(MASK_WEBDRIVER_SCRIPT, Vec::new())
            .await
            .context("Failed to mask navigator.webdriver")?;

        Ok(Self { driver })
    }

    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// Navigates to `url` and waits for the document to begin rendering.
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.driver.goto(url).await.with_context(|| format!("Failed to open {}", url))?;
        Ok(())
    }

    /// Scrolls from the top to the current document height in even steps,
    /// pausing between steps so lazy-loaded content has time to appear.
    pub async fn scroll_page(&self, steps: u32, step_pause: Duration) {
        debug!("Scrolling page in {} steps", steps);

        let height = match self.driver.execute("return document.body.scrollHeight;", Vec::new()).await
        {
            Ok(ret) => ret.json().as_f64().unwrap_or(0.0),
            Err(_) => return,
        };

        let steps = steps.max(1);
        for i in 1..=steps {
            let target = height * f64::from(i) / f64::from(steps);
            let _ = self
                .driver
                .execute(&format!("window.scrollTo(0, {});", target), Vec::new())
                .await;
            sleep(step_pause).await;
        }
    }

    /// Scrolls down one viewport height at a time.
    pub async fn scroll_by_viewport(&self, times: u32, pause: Duration) {
        for _ in 0..times {
            let _ = self
                .driver
                .execute("window.scrollBy(0, window.innerHeight);", Vec::new())
                .await;
            sleep(pause).await;
        }
    }

    /// Scrolls a fixed pixel distance.
    pub async fn scroll_by(&self, pixels: i64) {
        let _ = self
            .driver
            .execute(&format!("window.scrollBy(0, {});", pixels), Vec::new())
            .await;
    }

    /// Closes the session and the browser.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await.context("Failed to quit WebDriver session")?;
        Ok(())
    }
}
