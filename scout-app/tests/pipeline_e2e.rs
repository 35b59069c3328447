mod common;
use chrono::{TimeZone, Utc};
use scout_app::cli::{Cli, Command};
use scout_app::pipeline::{Backend, Pipeline};
use scout_common::ScoutError;
use scout_config::ScoutConfig;
use scout_discussions::Classification;
use scout_discussions::store::load_json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/listing.html")
}

fn config(out: &Path) -> ScoutConfig {
    let mut cfg = ScoutConfig::default();
    cfg.output.path = out.to_path_buf();
    cfg
}

fn snapshot_pipeline(cfg: ScoutConfig, html: PathBuf) -> Pipeline {
    common::init_test_tracing();
    Pipeline::with_backend(cfg, &Backend::Snapshot(html)).unwrap()
}

#[tokio::test]
async fn fetch_keeps_recent_window_newest_first() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("discussions.json");
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();

    let text = snapshot_pipeline(config(&out), fixture())
        .fetch(now)
        .await
        .unwrap();

    assert!(text.contains("Found 2 discussions from the last 30 days out of 4 total"));
    assert!(text.contains("=== MOST RECENT DISCUSSION (LAST 30 DAYS) ==="));
    assert!(text.contains("Title: Please add support for batch requests"));
    assert!(text.contains("Time: 2024-06-28T08:30:00Z (2 days ago)"));

    let saved = load_json(&out).unwrap();
    let titles: Vec<&str> = saved.iter().map(|d| d.record.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Please add support for batch requests",
            "Playground crashes when uploading images",
        ]
    );
    assert!(saved.iter().all(|d| d.analysis.is_none()));
    assert_eq!(
        saved[0].record.url,
        "https://github.com/orgs/community/discussions/502"
    );
}

#[tokio::test]
async fn fetch_writes_empty_array_when_window_is_empty() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("discussions.json");
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let text = snapshot_pipeline(config(&out), fixture())
        .fetch(now)
        .await
        .unwrap();

    assert!(text.contains("No discussions found from the last 30 days."));
    assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "[]");
}

#[tokio::test]
async fn fetch_writes_empty_array_and_probes_unknown_layout() {
    let dir = TempDir::new().unwrap();
    let html = dir.path().join("page.html");
    std::fs::write(
        &html,
        r#"<ul><li class="Box-row"><a href="/orgs/community/discussions/9">Moved</a></li></ul>"#,
    )
    .unwrap();
    let out = dir.path().join("discussions.json");

    let text = snapshot_pipeline(config(&out), html)
        .fetch(Utc::now())
        .await
        .unwrap();

    assert!(text.contains("Found 1 li.Box-row elements"));
    assert!(text.contains("Moved (https://github.com/orgs/community/discussions/9)"));
    assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "[]");
}

#[tokio::test]
async fn fetch_writes_empty_array_on_render_failure() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("discussions.json");

    let result = snapshot_pipeline(config(&out), dir.path().join("missing.html"))
        .fetch(Utc::now())
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "[]");
}

#[tokio::test]
async fn analyze_classifies_and_saves() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("analysis.json");

    let text = snapshot_pipeline(config(&out), fixture())
        .analyze(true)
        .await
        .unwrap();

    assert!(text.contains("Bug Reports: 1\nFeature Requests: 1\nQuestions: 1\nOther Discussions: 1\n"));
    assert!(text.contains("1. Playground crashes when uploading images\n   By: octocat | 10 days ago | 12 comments\n   Confidence: 30%"));
    assert!(text.contains("4. 💬 Community call notes\n   By: Unknown | unknown time | 0 comments"));

    let saved = load_json(&out).unwrap();
    assert_eq!(saved.len(), 4);
    assert_eq!(
        saved[0].analysis.map(|a| a.classification),
        Some(Classification::FeatureRequest)
    );
}

#[tokio::test]
async fn scrape_keeps_page_title() {
    let dir = TempDir::new().unwrap();
    let scrape = snapshot_pipeline(config(&dir.path().join("x.json")), fixture())
        .scrape()
        .await
        .unwrap();
    assert_eq!(scrape.page_title.as_deref(), Some("Models · Discussions"));
    assert_eq!(scrape.records.len(), 4);
}

#[tokio::test]
async fn latest_reports_newest() {
    let dir = TempDir::new().unwrap();
    let text = snapshot_pipeline(config(&dir.path().join("x.json")), fixture())
        .latest()
        .await
        .unwrap();
    assert!(text.starts_with("=== MOST RECENT DISCUSSION ===\nTitle: Please add support for batch requests\n"));
    assert!(text.contains("Author: hubot\n"));
}

#[tokio::test]
async fn latest_on_empty_page_is_no_discussions_error() {
    let dir = TempDir::new().unwrap();
    let html = dir.path().join("empty.html");
    std::fs::write(&html, "<html><body></body></html>").unwrap();

    let err = snapshot_pipeline(config(&dir.path().join("x.json")), html)
        .latest()
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScoutError>(),
        Some(ScoutError::NoDiscussions { .. })
    ));
}

#[tokio::test]
async fn report_command_reads_saved_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("discussions.json");
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
    snapshot_pipeline(config(&out), fixture())
        .fetch(now)
        .await
        .unwrap();

    let cli = <Cli as clap::Parser>::try_parse_from([
        "scout",
        "report",
        "--input",
        out.to_str().unwrap(),
        "--limit",
        "1",
    ])
    .unwrap();
    assert!(matches!(cli.command, Command::Report { .. }));

    let mut cfg = ScoutConfig::default();
    cli.apply_overrides(&mut cfg);
    let text = cli.execute(cfg, now).await.unwrap();

    assert!(text.contains("=== MOST RECENT DISCUSSION ===\nTitle: Please add support for batch requests"));
    assert!(text.contains("Bug Reports: 1\nFeature Requests: 1\n"));
    assert!(text.contains("1. ✨ Please add support for batch requests"));
    assert!(!text.contains("2. 🐛"));
}
