//! Browser session management over WebDriver.

pub mod session;

pub use session::Browser;
