//! Plain-text reports printed by the CLI.
use std::fmt::Write as _;

use crate::types::{AnalyzedDiscussion, Classification};

/// Time column of a per-item line.
fn when(d: &AnalyzedDiscussion) -> &str {
    d.record
        .time_text
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(d.record.datetime.as_deref())
        .unwrap_or("unknown time")
}

fn byline(d: &AnalyzedDiscussion) -> String {
    format!(
        "   By: {} | {} | {} comments",
        d.record.author,
        when(d),
        d.record.comment_count
    )
}

/// Detail block for a single discussion under `=== heading ===`.
pub fn render_latest(d: &AnalyzedDiscussion, heading: &str) -> String {
    let r = &d.record;
    let mut out = String::new();
    let _ = writeln!(out, "=== {heading} ===");
    let _ = writeln!(out, "Title: {}", r.title);
    let _ = writeln!(out, "Author: {}", r.author);
    let _ = writeln!(
        out,
        "Time: {} ({})",
        r.datetime.as_deref().unwrap_or("unknown"),
        r.time_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("no relative time")
    );
    let _ = writeln!(out, "Comments: {}", r.comment_count);
    if let Some(a) = &d.analysis {
        let _ = writeln!(
            out,
            "Classification: {} ({}% confidence)",
            a.classification, a.confidence
        );
    }
    let _ = writeln!(out, "URL: {}", r.url);
    out
}

fn summary_heading(label: Classification) -> &'static str {
    match label {
        Classification::BugReport => "Bug Reports",
        Classification::FeatureRequest => "Feature Requests",
        Classification::Question => "Questions",
        Classification::Discussion => "Other Discussions",
    }
}

fn count(items: &[AnalyzedDiscussion], label: Classification) -> usize {
    items
        .iter()
        .filter(|d| d.analysis.is_some_and(|a| a.classification == label))
        .count()
}

/// Full analysis report. `items` are expected newest first; the per-item
/// section lists at most `limit` of them.
pub fn render_analysis(items: &[AnalyzedDiscussion], limit: usize) -> String {
    let mut out = String::new();

    match items.first() {
        Some(latest) => out.push_str(&render_latest(latest, "MOST RECENT DISCUSSION")),
        None => {
            out.push_str("No discussions found.\n");
            return out;
        }
    }

    let _ = writeln!(out, "\n=== CLASSIFICATION SUMMARY ===");
    for label in Classification::ALL {
        let _ = writeln!(out, "{}: {}", summary_heading(label), count(items, label));
    }
    let bugs = count(items, Classification::BugReport);

    let _ = writeln!(out, "\n=== BUG REPORTS IDENTIFIED ===");
    if bugs == 0 {
        let _ = writeln!(out, "No bug reports identified in recent discussions.");
    }
    let bug_reports = items.iter().filter_map(|d| {
        d.analysis
            .filter(|a| a.classification == Classification::BugReport)
            .map(|a| (d, a))
    });
    for (i, (d, a)) in bug_reports.enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, d.record.title);
        let _ = writeln!(out, "{}", byline(d));
        let _ = writeln!(out, "   Confidence: {}%", a.confidence);
        let _ = writeln!(out, "   {}", d.record.url);
        out.push('\n');
    }

    let _ = writeln!(out, "\n=== ALL RECENT DISCUSSIONS WITH ANALYSIS ===");
    for (i, d) in items.iter().take(limit).enumerate() {
        match &d.analysis {
            Some(a) => {
                let _ = writeln!(
                    out,
                    "{}. {} {}",
                    i + 1,
                    a.classification.marker(),
                    d.record.title
                );
                let _ = writeln!(out, "{}", byline(d));
                let _ = writeln!(
                    out,
                    "   Classification: {} ({}%)",
                    a.classification, a.confidence
                );
            }
            None => {
                let _ = writeln!(out, "{}. {}", i + 1, d.record.title);
                let _ = writeln!(out, "{}", byline(d));
            }
        }
        let _ = writeln!(out, "   {}", d.record.url);
        out.push('\n');
    }

    out
}
