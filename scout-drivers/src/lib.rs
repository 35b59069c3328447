//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session and page helpers used to render
//! listing pages that need a real browser.
//!
//! - [`scout_browser::driver::ScoutDriver`]: WebDriver client wrapper
//! - [`scout_browser::page::ScoutPage`]: navigation, waits, and debug captures
pub mod scout_browser;
