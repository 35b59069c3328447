use serde::{Deserialize, Serialize};
use std::fmt;

/// One discussion as it appears on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionRecord {
    pub title: String,
    /// Absolute link to the discussion.
    pub url: String,
    pub author: String,
    /// Machine-readable timestamp from the `datetime` attribute.
    pub datetime: Option<String>,
    /// Relative time as displayed ("3 days ago").
    pub time_text: Option<String>,
    /// Visible text of the comment link, not parsed.
    pub comment_count: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BugReport,
    FeatureRequest,
    Question,
    Discussion,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::BugReport,
        Classification::FeatureRequest,
        Classification::Question,
        Classification::Discussion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::BugReport => "bug_report",
            Classification::FeatureRequest => "feature_request",
            Classification::Question => "question",
            Classification::Discussion => "discussion",
        }
    }

    /// Marker used in the per-item listing.
    pub fn marker(self) -> &'static str {
        match self {
            Classification::BugReport => "🐛",
            Classification::FeatureRequest => "✨",
            Classification::Question => "❓",
            Classification::Discussion => "💬",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the keyword classifier for one title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub classification: Classification,
    /// Always within `0..=95`.
    pub confidence: u8,
    pub bug_score: u32,
    pub feature_score: u32,
    pub question_score: u32,
}

/// A record with its classification attached; serializes flat so the
/// classification keys sit next to the record keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedDiscussion {
    #[serde(flatten)]
    pub record: DiscussionRecord,
    #[serde(flatten)]
    pub analysis: Option<ClassificationResult>,
}

impl From<DiscussionRecord> for AnalyzedDiscussion {
    fn from(record: DiscussionRecord) -> Self {
        Self {
            record,
            analysis: None,
        }
    }
}
