use anyhow::{anyhow, Result};
use fantoccini::{Client, Locator};
use scout_common::ScoutError;
use std::time::Duration;
use tracing::info;

/// High-level page wrapper providing navigation, waits, and the captures
/// used for debugging a page that did not render as expected.
pub struct ScoutPage {
    pub(crate) client: Client,
}

impl ScoutPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigate to `url`, giving up after `timeout`.
    pub async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        info!(target: "scout.browser", %url, "navigating");
        match tokio::time::timeout(timeout, self.client.goto(url)).await {
            Ok(result) => result.map_err(anyhow::Error::from),
            Err(_) => Err(anyhow::Error::from(ScoutError::Timeout {
                seconds: timeout.as_secs(),
            })
            .context(format!("navigation to {url}"))),
        }
    }

    /// Wait until at least one element matches `selector`.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        info!(target: "scout.browser", %selector, "waiting for selector");
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| {
                anyhow!(
                    "selector `{selector}` did not appear within {}s: {e}",
                    timeout.as_secs()
                )
            })?;
        Ok(())
    }

    /// Return the full page HTML source.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::msg)
    }

    /// Return the page title.
    pub async fn get_title(&self) -> Result<String> {
        self.client.title().await.map_err(anyhow::Error::msg)
    }

    /// Return the current page URL.
    pub async fn get_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::msg)
    }

    /// PNG screenshot of the current viewport.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client.screenshot().await.map_err(anyhow::Error::msg)
    }

    /// Number of elements currently matching `selector`.
    pub async fn count(&self, selector: &str) -> Result<usize> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements.len())
    }
}
