//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// WebDriver server endpoint (chromedriver default port).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent presented by the browser session.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Marketplace origin, prefixed onto relative product links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Search-result URLs processed by the `run` command.
    #[serde(default)]
    pub search_urls: Vec<String>,

    /// Maximum products collected per search URL.
    #[serde(default = "default_max_products")]
    pub max_products: usize,

    /// Maximum search-result pages walked per search URL.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum review pages walked per product.
    #[serde(default = "default_max_review_pages")]
    pub max_review_pages: u32,

    /// Base delay between product page visits in milliseconds.
    #[serde(default = "default_product_delay_ms")]
    pub product_delay_ms: u64,

    /// Random jitter added to the delay (0 to this value).
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Steps used when scrolling a results page to trigger lazy loading.
    #[serde(default = "default_scroll_steps")]
    pub scroll_steps: u32,

    /// Base directory for persisted JSON/CSV output.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_base_url() -> String {
    "https://www.tokopedia.com".to_string()
}

fn default_max_products() -> usize {
    50
}

fn default_max_pages() -> u32 {
    2
}

fn default_max_review_pages() -> u32 {
    2
}

fn default_product_delay_ms() -> u64 {
    500
}

fn default_delay_jitter_ms() -> u64 {
    250
}

fn default_scroll_steps() -> u32 {
    30
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: default_user_agent(),
            base_url: default_base_url(),
            search_urls: Vec::new(),
            max_products: default_max_products(),
            max_pages: default_max_pages(),
            max_review_pages: default_max_review_pages(),
            product_delay_ms: default_product_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            scroll_steps: default_scroll_steps(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("toko-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("TOKO_WEBDRIVER") {
            self.webdriver_url = endpoint;
        }

        if let Ok(headless) = std::env::var("TOKO_HEADLESS") {
            if let Ok(value) = headless.parse() {
                self.headless = value;
            }
        }

        if let Ok(delay) = std::env::var("TOKO_DELAY") {
            if let Ok(value) = delay.parse() {
                self.product_delay_ms = value;
            }
        }

        self
    }
}
