//! Maps rendered listing items to [`DiscussionRecord`]s.
//!
//! Backends expose each discussion as an [`ItemHandle`]; every lookup on a
//! handle may come back empty. Only the title link is mandatory: items
//! without one are skipped, every other field falls back to a default.
use crate::types::DiscussionRecord;

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const NO_COMMENTS: &str = "0";

/// Read access to one located element.
pub trait ElementView {
    /// Text content, untrimmed.
    fn text(&self) -> String;
    fn attr(&self, name: &str) -> Option<String>;
    /// Link target resolved to an absolute URL.
    fn href(&self) -> Option<String>;
}

/// One discussion item on a rendered page.
pub trait ItemHandle {
    type Element: ElementView;

    fn title_link(&self) -> Option<Self::Element>;
    fn author_link(&self) -> Option<Self::Element>;
    fn timestamp(&self) -> Option<Self::Element>;
    fn comment_link(&self) -> Option<Self::Element>;
}

/// Anything that can enumerate the discussion items of a rendered page.
pub trait ListingSource {
    type Item<'a>: ItemHandle
    where
        Self: 'a;

    fn list_items(&self) -> Vec<Self::Item<'_>>;
}

/// Extract records from `items`, preserving their order.
pub fn extract<I>(items: I) -> Vec<DiscussionRecord>
where
    I: IntoIterator,
    I::Item: ItemHandle,
{
    let mut seen = 0usize;
    let records: Vec<DiscussionRecord> = items
        .into_iter()
        .inspect(|_| seen += 1)
        .filter_map(|item| extract_one(&item))
        .collect();

    tracing::debug!(
        target: "scout.extract",
        items = seen,
        records = records.len(),
        skipped = seen - records.len(),
        "extracted discussion records"
    );
    records
}

/// Extract every item a [`ListingSource`] exposes.
pub fn extract_from<S: ListingSource>(source: &S) -> Vec<DiscussionRecord> {
    extract(source.list_items())
}

/// `None` when the item has no usable title link.
pub fn extract_one<H: ItemHandle>(item: &H) -> Option<DiscussionRecord> {
    let title_link = item.title_link()?;
    let title = non_empty(title_link.text())?;
    let url = title_link.href().and_then(non_empty)?;

    let author = item
        .author_link()
        .map(|el| trimmed(el.text()))
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let timestamp = item.timestamp();
    let datetime = timestamp
        .as_ref()
        .and_then(|el| el.attr("datetime"))
        .and_then(non_empty);
    let time_text = timestamp.as_ref().map(|el| trimmed(el.text()));

    let comment_count = item
        .comment_link()
        .map(|el| trimmed(el.text()))
        .unwrap_or_else(|| NO_COMMENTS.to_string());

    Some(DiscussionRecord {
        title,
        url,
        author,
        datetime,
        time_text,
        comment_count,
    })
}

fn trimmed(s: String) -> String {
    s.trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
