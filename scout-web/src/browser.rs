use anyhow::{Context, Result};
use scout_config::{BrowserSettings, TargetSettings};
use scout_drivers::scout_browser::driver::ScoutDriver;
use scout_drivers::scout_browser::page::ScoutPage;
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL after redirects; relative links resolve against it.
    pub url: Url,
    pub html: String,
    pub title: Option<String>,
}

#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, target: &TargetSettings) -> Result<RenderedPage>;
}

fn target_url(target: &TargetSettings) -> Result<Url> {
    Url::parse(&target.url).with_context(|| format!("invalid target url `{}`", target.url))
}

fn page_title(html: &str) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    let doc = Html::parse_document(html);
    let title = doc.select(&sel).next()?.text().collect::<String>();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Renders through a real Chrome session driven over WebDriver.
pub struct BrowserRenderer {
    settings: BrowserSettings,
    debug_screenshot: Option<PathBuf>,
}

impl BrowserRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            debug_screenshot: None,
        }
    }

    /// Write a PNG of the viewport here when rendering fails.
    pub fn with_debug_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_screenshot = Some(path.into());
        self
    }

    async fn load(&self, page: &ScoutPage, target: &TargetSettings, url: Url) -> Result<RenderedPage> {
        page.goto(
            url.as_str(),
            Duration::from_secs(target.navigation_timeout_secs),
        )
        .await?;
        info!(target: "scout.browser", selector = %target.item_wait_selector, "waiting for discussions to load");
        page.wait_for(
            &target.item_wait_selector,
            Duration::from_secs(target.wait_timeout_secs),
        )
        .await?;

        let html = page.get_content().await.context("failed to read page source")?;
        let title = page.get_title().await.ok().filter(|t| !t.is_empty());
        let url = page
            .get_url()
            .await
            .ok()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or(url);
        Ok(RenderedPage { url, html, title })
    }

    /// Best effort; every failure here is only logged.
    async fn collect_debug(&self, page: &ScoutPage) {
        if let Some(path) = &self.debug_screenshot {
            match page.screenshot().await {
                Ok(png) => match tokio::fs::write(path, png).await {
                    Ok(()) => info!(target: "scout.browser", path = %path.display(), "saved debug screenshot"),
                    Err(e) => warn!(target: "scout.browser", path = %path.display(), error = %e, "could not write screenshot"),
                },
                Err(e) => warn!(target: "scout.browser", error = %e, "screenshot failed"),
            }
        }

        let title = page.get_title().await.unwrap_or_default();
        let current = page.get_url().await.unwrap_or_default();
        let list_items = page.count("li").await.unwrap_or(0);
        warn!(
            target: "scout.browser",
            page_title = %title,
            current_url = %current,
            list_items,
            "page did not render the discussion list"
        );
    }
}

#[async_trait::async_trait]
impl PageRenderer for BrowserRenderer {
    async fn render(&self, target: &TargetSettings) -> Result<RenderedPage> {
        let url = target_url(target)?;
        let driver = ScoutDriver::new(&self.settings).await?;
        let page = driver.page();

        let result = match self.load(&page, target, url).await {
            Ok(rendered) => Ok(rendered),
            Err(e) => {
                self.collect_debug(&page).await;
                Err(e)
            }
        };

        // Always attempt to close the session before returning
        if let Err(e) = driver.close().await {
            warn!(target: "scout.browser", error = %e, "failed to close webdriver session");
        }
        result
    }
}

/// Plain GET for server-rendered listings. No script execution.
pub struct HttpRenderer {
    client: reqwest::Client,
    pub timeout: Duration,
}

impl HttpRenderer {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait::async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, target: &TargetSettings) -> Result<RenderedPage> {
        let url = target_url(target)?;
        info!(target: "scout.http", %url, "fetching listing");

        let resp = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;

        let url = resp.url().clone();
        let html = resp.text().await.context("failed to read response body")?;
        let title = page_title(&html);
        Ok(RenderedPage { url, html, title })
    }
}

/// Serves a saved copy of a listing page.
pub struct SnapshotRenderer {
    path: PathBuf,
}

impl SnapshotRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl PageRenderer for SnapshotRenderer {
    async fn render(&self, target: &TargetSettings) -> Result<RenderedPage> {
        let url = target_url(target)?;
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read snapshot {}", self.path.display()))?;
        info!(target: "scout.snapshot", path = %self.path.display(), bytes = html.len(), "loaded snapshot");
        let title = page_title(&html);
        Ok(RenderedPage { url, html, title })
    }
}
