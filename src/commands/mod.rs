//! CLI command implementations.

pub mod product;
pub mod run;
pub mod search;

pub use product::ProductCommand;
pub use run::RunCommand;
pub use search::SearchCommand;
