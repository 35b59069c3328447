//! Render → extract → sort → (classify) → report / persist.
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use scout_common::ScoutError;
use scout_config::{ScoutConfig, SelectorProfile};
use scout_discussions::report::{render_analysis, render_latest};
use scout_discussions::store::{load_json, save_json};
use scout_discussions::{
    AnalyzedDiscussion, DiscussionRecord, annotate, extract_from, filter_recent, sort_by_recency,
};
use scout_web::{
    BrowserRenderer, HttpRenderer, ListingDocument, PageRenderer, ProbeReport, RenderedPage,
    SnapshotRenderer, render_probe,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use url::Url;

/// Where the listing HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Browser,
    Http,
    Snapshot(PathBuf),
}

pub fn renderer_for(backend: &Backend, config: &ScoutConfig) -> Result<Box<dyn PageRenderer>> {
    let renderer: Box<dyn PageRenderer> = match backend {
        Backend::Browser => Box::new(
            BrowserRenderer::new(config.browser.clone())
                .with_debug_screenshot(config.output.debug_screenshot.clone()),
        ),
        Backend::Http => Box::new(HttpRenderer::new(std::time::Duration::from_secs(
            config.target.navigation_timeout_secs,
        ))?),
        Backend::Snapshot(path) => Box::new(SnapshotRenderer::new(path.clone())),
    };
    Ok(renderer)
}

/// Records found on one rendered page, newest first.
#[derive(Debug)]
pub struct Scrape {
    pub page_url: Url,
    pub page_title: Option<String>,
    pub records: Vec<DiscussionRecord>,
    /// Present only when nothing could be extracted.
    pub probe: Option<ProbeReport>,
}

/// Parse a rendered page and pull out its discussions. Kept synchronous:
/// the parsed document must not live across an await point.
pub fn read_listing(page: &RenderedPage, profiles: &[SelectorProfile]) -> Result<Scrape> {
    let doc = ListingDocument::parse(&page.html, page.url.clone(), profiles)?;
    let records = sort_by_recency(extract_from(&doc));
    let probe = records.is_empty().then(|| doc.probe());
    Ok(Scrape {
        page_url: page.url.clone(),
        page_title: page.title.clone(),
        records,
        probe,
    })
}

pub struct Pipeline {
    config: ScoutConfig,
    renderer: Box<dyn PageRenderer>,
}

impl Pipeline {
    pub fn new(config: ScoutConfig, renderer: Box<dyn PageRenderer>) -> Self {
        Self { config, renderer }
    }

    pub fn with_backend(config: ScoutConfig, backend: &Backend) -> Result<Self> {
        let renderer = renderer_for(backend, &config)?;
        Ok(Self::new(config, renderer))
    }

    pub async fn scrape(&self) -> Result<Scrape> {
        info!(target: "scout.pipeline", url = %self.config.target.url, "rendering listing");
        let page = self.renderer.render(&self.config.target).await?;
        let scrape = read_listing(&page, &self.config.selectors)?;
        let page_title = scrape.page_title.as_deref().unwrap_or("");

        match &scrape.probe {
            Some(probe) => warn!(
                target: "scout.pipeline",
                url = %scrape.page_url,
                page_title,
                box_rows = probe.box_rows,
                title_links = probe.title_links,
                list_items = probe.list_items,
                discussion_links = probe.discussion_links.len(),
                "no discussions found"
            ),
            None => info!(
                target: "scout.pipeline",
                url = %scrape.page_url,
                page_title,
                count = scrape.records.len(),
                "extracted discussions"
            ),
        }
        Ok(scrape)
    }

    fn save_empty(&self, out: &mut String) -> Result<()> {
        let path = &self.config.output.path;
        save_json::<DiscussionRecord>(path, &[])?;
        let _ = writeln!(out, "Saved empty discussions array to {}", path.display());
        Ok(())
    }

    /// Scrape, keep the recency window, and persist it. The output file is
    /// written in every outcome, as an empty array when nothing qualifies.
    pub async fn fetch(&self, now: DateTime<Utc>) -> Result<String> {
        let days = self.config.output.recent_days;
        let path = &self.config.output.path;
        let mut out = String::new();

        let scrape = match self.scrape().await {
            Ok(scrape) => scrape,
            Err(e) => {
                error!(target: "scout.pipeline", error = %e, "fetch failed");
                save_json::<DiscussionRecord>(path, &[])?;
                return Err(e.context(format!(
                    "fetch failed; saved empty discussions array to {}",
                    path.display()
                )));
            }
        };

        if let Some(probe) = &scrape.probe {
            out.push_str("No discussions found.\n");
            out.push_str(&render_probe(probe));
            self.save_empty(&mut out)?;
            return Ok(out);
        }

        let total = scrape.records.len();
        let recent = filter_recent(scrape.records, now, days);
        let cutoff = now - Duration::days(i64::from(days));
        let _ = writeln!(
            out,
            "Found {} discussions from the last {days} days out of {total} total",
            recent.len()
        );
        let _ = writeln!(
            out,
            "Date range: {} to {}",
            cutoff.to_rfc3339(),
            now.to_rfc3339()
        );

        let Some(latest) = recent.first().cloned() else {
            let _ = writeln!(out, "No discussions found from the last {days} days.");
            self.save_empty(&mut out)?;
            return Ok(out);
        };

        save_json(path, &recent)?;
        let _ = writeln!(
            out,
            "Saved {} discussions to {}\n",
            recent.len(),
            path.display()
        );
        out.push_str(&render_latest(
            &AnalyzedDiscussion::from(latest),
            &format!("MOST RECENT DISCUSSION (LAST {days} DAYS)"),
        ));
        Ok(out)
    }

    /// Scrape and classify every discussion; optionally persist the result.
    pub async fn analyze(&self, save: bool) -> Result<String> {
        let scrape = self.scrape().await?;
        if let Some(probe) = &scrape.probe {
            let mut out = String::from("No discussions found.\n");
            out.push_str(&render_probe(probe));
            return Ok(out);
        }

        let analyzed = annotate(scrape.records);
        let mut out = render_analysis(&analyzed, self.config.output.listing_limit);
        if save {
            let path = &self.config.output.path;
            save_json(path, &analyzed)?;
            let _ = writeln!(
                out,
                "Saved {} analyzed discussions to {}",
                analyzed.len(),
                path.display()
            );
        }
        Ok(out)
    }

    /// The newest discussion on the page.
    pub async fn latest(&self) -> Result<String> {
        let scrape = self.scrape().await?;
        match scrape.records.into_iter().next() {
            Some(record) => Ok(render_latest(
                &AnalyzedDiscussion::from(record),
                "MOST RECENT DISCUSSION",
            )),
            None => Err(ScoutError::NoDiscussions {
                url: scrape.page_url.to_string(),
            }
            .into()),
        }
    }
}

/// Offline report over a file written by `fetch` or `analyze --save`.
/// Titles are classified again so older files report consistently.
pub fn report_from_file(path: &Path, limit: usize) -> Result<String> {
    let saved = load_json(path)
        .with_context(|| format!("failed to load discussions from {}", path.display()))?;
    let records: Vec<DiscussionRecord> = saved.into_iter().map(|d| d.record).collect();
    let analyzed = sort_by_recency(annotate(records));
    Ok(render_analysis(&analyzed, limit))
}
