//! Recency ordering and the recency window.
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::types::{AnalyzedDiscussion, DiscussionRecord};

/// Anything carrying the raw `datetime` of a discussion.
pub trait Dated {
    fn datetime(&self) -> Option<&str>;
}

impl Dated for DiscussionRecord {
    fn datetime(&self) -> Option<&str> {
        self.datetime.as_deref()
    }
}

impl Dated for AnalyzedDiscussion {
    fn datetime(&self) -> Option<&str> {
        self.record.datetime.as_deref()
    }
}

/// Parse a listing timestamp. Accepts RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Order discussions newest first.
///
/// Only items with a parseable datetime move: they are sorted (stably,
/// descending) among the positions dated items already occupy. Undated
/// items keep their exact index.
pub fn sort_by_recency<T: Dated>(items: Vec<T>) -> Vec<T> {
    let mut dated: Vec<(DateTime<Utc>, usize)> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.datetime().and_then(parse_timestamp).map(|ts| (ts, i)))
        .collect();

    if dated.len() < 2 {
        return items;
    }

    let slots: Vec<usize> = dated.iter().map(|(_, i)| *i).collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut cells: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut moved: Vec<Option<T>> = Vec::with_capacity(dated.len());
    for (_, from) in &dated {
        moved.push(cells[*from].take());
    }
    for (slot, item) in slots.into_iter().zip(moved) {
        cells[slot] = item;
    }

    cells.into_iter().flatten().collect()
}

/// Keep discussions dated within the last `days` days of `now`.
/// Undated or unparseable entries are dropped.
pub fn filter_recent<T: Dated>(items: Vec<T>, now: DateTime<Utc>, days: u32) -> Vec<T> {
    let cutoff = now - Duration::days(i64::from(days));
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| {
            item.datetime()
                .and_then(parse_timestamp)
                .is_some_and(|ts| ts >= cutoff)
        })
        .collect();

    tracing::debug!(
        target: "scout.sort",
        total,
        kept = kept.len(),
        %cutoff,
        "applied recency window"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(title: &str, dt: Option<&str>) -> DiscussionRecord {
        DiscussionRecord {
            title: title.to_string(),
            url: format!("https://github.com/orgs/community/discussions/{title}"),
            author: "Unknown".to_string(),
            datetime: dt.map(str::to_string),
            time_text: None,
            comment_count: "0".to_string(),
        }
    }

    fn titles(items: &[DiscussionRecord]) -> Vec<&str> {
        items.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn parses_supported_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-06-01"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn newest_first() {
        let sorted = sort_by_recency(vec![
            rec("jan", Some("2024-01-01")),
            rec("jun", Some("2024-06-01")),
        ]);
        assert_eq!(titles(&sorted), vec!["jun", "jan"]);
    }

    #[test]
    fn undated_records_keep_relative_order() {
        let input = vec![rec("a", None), rec("b", None), rec("c", None)];
        assert_eq!(titles(&sort_by_recency(input)), vec!["a", "b", "c"]);
    }

    #[test]
    fn undated_records_keep_their_index() {
        let sorted = sort_by_recency(vec![
            rec("old", Some("2024-01-01T00:00:00Z")),
            rec("none", None),
            rec("new", Some("2024-03-01T00:00:00Z")),
            rec("junk", Some("last tuesday")),
            rec("mid", Some("2024-02-01T00:00:00Z")),
        ]);
        assert_eq!(titles(&sorted), vec!["new", "none", "mid", "junk", "old"]);
    }

    #[test]
    fn equal_timestamps_are_stable() {
        let sorted = sort_by_recency(vec![
            rec("first", Some("2024-05-05T05:05:05Z")),
            rec("second", Some("2024-05-05T07:05:05+02:00")),
            rec("newer", Some("2024-05-06")),
        ]);
        assert_eq!(titles(&sorted), vec!["newer", "first", "second"]);
    }

    #[test]
    fn dated_items_end_up_descending() {
        let days = [12, 3, 27, 3, 9, 18, 1, 30, 22, 5];
        let input: Vec<DiscussionRecord> = days
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let dt = (i % 3 != 0).then(|| format!("2024-04-{d:02}"));
                rec(&format!("r{i}"), dt.as_deref())
            })
            .collect();
        let sorted = sort_by_recency(input.clone());

        assert_eq!(sorted.len(), input.len());
        let stamps: Vec<DateTime<Utc>> = sorted
            .iter()
            .filter_map(|r| r.datetime.as_deref().and_then(parse_timestamp))
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
        for (i, r) in input.iter().enumerate() {
            if r.datetime.is_none() {
                assert_eq!(sorted[i], *r);
            }
        }
    }

    #[test]
    fn recency_window_drops_old_and_undated() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let kept = filter_recent(
            vec![
                rec("fresh", Some("2024-06-29T00:00:00Z")),
                rec("edge", Some("2024-05-31T12:00:00Z")),
                rec("stale", Some("2024-05-01T00:00:00Z")),
                rec("undated", None),
            ],
            now,
            30,
        );
        assert_eq!(titles(&kept), vec!["fresh", "edge"]);
    }

    #[test]
    fn works_on_analyzed_discussions() {
        let sorted = sort_by_recency(vec![
            AnalyzedDiscussion::from(rec("a", Some("2023-01-01"))),
            AnalyzedDiscussion::from(rec("b", Some("2023-02-01"))),
        ]);
        assert_eq!(sorted[0].record.title, "b");
    }
}
