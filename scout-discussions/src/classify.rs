//! Keyword heuristic that labels discussion titles.
//!
//! Rules are evaluated in a fixed priority order (bug, feature, question);
//! the first rule with at least one keyword hit wins, otherwise the title is
//! a plain discussion.
use crate::types::{AnalyzedDiscussion, Classification, ClassificationResult, DiscussionRecord};

pub const BUG_KEYWORDS: &[&str] = &[
    "bug",
    "error",
    "issue",
    "problem",
    "broken",
    "not working",
    "fail",
    "crash",
    "exception",
    "unexpected",
    "wrong",
    "incorrect",
    "unable to",
    "cannot",
    "doesn't work",
    "does not work",
    "regression",
    "breaking",
    "malfunction",
    "glitch",
    "defect",
    "fault",
    "anomaly",
];

pub const FEATURE_KEYWORDS: &[&str] = &[
    "feature",
    "request",
    "enhancement",
    "improvement",
    "suggestion",
    "proposal",
    "idea",
    "add",
    "support for",
    "would be nice",
    "could we",
    "please add",
    "new feature",
    "capability",
    "functionality",
];

pub const QUESTION_KEYWORDS: &[&str] = &[
    "how to",
    "how do",
    "question",
    "help",
    "clarification",
    "documentation",
    "tutorial",
    "guide",
    "example",
    "usage",
    "best practice",
    "recommend",
];

pub const DISCUSSION_CONFIDENCE: u32 = 30;
pub const MAX_CONFIDENCE: u32 = 95;

struct Boost {
    any_of: &'static [&'static str],
    bonus: u32,
}

struct Rule {
    label: Classification,
    keywords: &'static [&'static str],
    weight: u32,
    cap: u32,
    boosts: &'static [Boost],
    /// Added when the thread has more than [`BUSY_THREAD_COMMENTS`] comments.
    busy_thread_bonus: u32,
}

const BUSY_THREAD_COMMENTS: i64 = 5;

const RULES: [Rule; 3] = [
    Rule {
        label: Classification::BugReport,
        keywords: BUG_KEYWORDS,
        weight: 25,
        cap: 90,
        boosts: &[
            Boost {
                any_of: &["error", "bug"],
                bonus: 10,
            },
            Boost {
                any_of: &["not working", "broken"],
                bonus: 15,
            },
        ],
        busy_thread_bonus: 5,
    },
    Rule {
        label: Classification::FeatureRequest,
        keywords: FEATURE_KEYWORDS,
        weight: 20,
        cap: 80,
        boosts: &[],
        busy_thread_bonus: 0,
    },
    Rule {
        label: Classification::Question,
        keywords: QUESTION_KEYWORDS,
        weight: 15,
        cap: 70,
        boosts: &[],
        busy_thread_bonus: 0,
    },
];

fn score(title: &str, keywords: &[&str]) -> u32 {
    keywords.iter().filter(|kw| title.contains(*kw)).count() as u32
}

/// Integer prefix of `text`: optional sign, then digits. Anything else is 0.
/// Digit runs past the `i64` range saturate.
pub fn parse_comment_count(text: &str) -> i64 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

/// Classify a title. `comment_text` is the raw comment-count text.
pub fn classify(title: &str, comment_text: &str) -> ClassificationResult {
    let lowered = title.to_lowercase();
    let scores = RULES.map(|rule| score(&lowered, rule.keywords));
    let [bug_score, feature_score, question_score] = scores;

    let (classification, confidence) = RULES
        .iter()
        .zip(scores)
        .find(|(_, hits)| *hits > 0)
        .map(|(rule, hits)| {
            let mut confidence = (hits * rule.weight).min(rule.cap);
            for boost in rule.boosts {
                if boost.any_of.iter().any(|kw| lowered.contains(kw)) {
                    confidence += boost.bonus;
                }
            }
            if parse_comment_count(comment_text) > BUSY_THREAD_COMMENTS {
                confidence += rule.busy_thread_bonus;
            }
            (rule.label, confidence)
        })
        .unwrap_or((Classification::Discussion, DISCUSSION_CONFIDENCE));

    ClassificationResult {
        classification,
        confidence: confidence.min(MAX_CONFIDENCE) as u8,
        bug_score,
        feature_score,
        question_score,
    }
}

pub fn classify_record(record: &DiscussionRecord) -> ClassificationResult {
    classify(&record.title, &record.comment_count)
}

/// Attach a classification to every record, keeping order.
pub fn annotate(records: Vec<DiscussionRecord>) -> Vec<AnalyzedDiscussion> {
    records
        .into_iter()
        .map(|record| {
            let analysis = classify_record(&record);
            tracing::trace!(
                target: "scout.classify",
                title = %record.title,
                label = %analysis.classification,
                confidence = analysis.confidence,
                "classified"
            );
            AnalyzedDiscussion {
                record,
                analysis: Some(analysis),
            }
        })
        .collect()
}
