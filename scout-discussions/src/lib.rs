//! Discussion listing model, extraction, and keyword classification.
//!
//! The core is synchronous: a page backend (see `scout-web`)
//! hands over item handles, [`extract`] maps them to records, [`sort`] orders
//! them by recency, [`classify`] annotates them, and [`report`] / [`store`]
//! render or persist the result.
pub mod classify;
pub mod extract;
pub mod report;
pub mod sort;
pub mod store;
pub mod types;

pub use classify::{annotate, classify, classify_record};
pub use extract::{ElementView, ItemHandle, ListingSource, extract, extract_from};
pub use sort::{Dated, filter_recent, parse_timestamp, sort_by_recency};
pub use types::{AnalyzedDiscussion, Classification, ClassificationResult, DiscussionRecord};
