//! Page acquisition and HTML listing parsing.
//!
//! - Page renderers (`browser`): WebDriver, plain HTTP, or a saved snapshot
//! - Selector-driven listing (`listing`) implementing the core
//!   [`scout_discussions::ListingSource`] over a parsed document

pub mod browser;
pub mod listing;

pub use browser::{BrowserRenderer, HttpRenderer, PageRenderer, RenderedPage, SnapshotRenderer};
pub use listing::{ListingDocument, ProbeReport, render_probe};
