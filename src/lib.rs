//! toko-crawler - Browser-driven Tokopedia product crawler
//!
//! Drives a real Chrome session over WebDriver to collect search results,
//! product details, per-variant prices, and reviews.

pub mod browser;
pub mod commands;
pub mod config;
pub mod store;
pub mod text;
pub mod tokopedia;

pub use config::Config;
pub use tokopedia::models::{
    Combination, ProductDetail, ProductRecord, ProductSummary, Review, VariantAxis, VariantDetail,
};
