//! Tokopedia-specific modules for page access, collection, and data models.

pub mod models;
pub mod page;
pub mod product;
pub mod reviews;
pub mod search;
pub mod selectors;
pub mod variants;

pub use models::{
    Combination, ProductDetail, ProductRecord, ProductSummary, Review, VariantAxis, VariantDetail,
};
pub use page::{LivePage, PageProbe};
pub use product::ProductCollector;
pub use reviews::ReviewCollector;
pub use search::SearchCollector;
pub use variants::VariantResolver;
