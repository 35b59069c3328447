use crate::scout_browser::page::ScoutPage;
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use scout_config::BrowserSettings;
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

const WINDOW_SIZE: (u32, u32) = (1366, 900);

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct ScoutDriver {
    pub client: Client,
}

/// Construct Chrome command-line arguments for a browser session.
pub fn build_chrome_arguments(settings: &BrowserSettings) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        format!("--window-size={},{}", WINDOW_SIZE.0, WINDOW_SIZE.1),
    ];
    if settings.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args.extend(settings.extra_args.iter().cloned());
    args
}

impl ScoutDriver {
    /// Create a new driver connected to a running WebDriver service
    /// (Chromedriver at `settings.webdriver_url`).
    pub async fn new(settings: &BrowserSettings) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(build_chrome_arguments(settings)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        tracing::debug!(
            target: "scout.browser",
            webdriver = %settings.webdriver_url,
            headless = settings.headless,
            "connecting to webdriver"
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await
            .with_context(|| format!("failed to connect to webdriver at {}", settings.webdriver_url))?;

        Ok(Self { client })
    }

    /// A page handle sharing this session.
    pub fn page(&self) -> ScoutPage {
        ScoutPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_switches() {
        let settings = BrowserSettings {
            headless: true,
            ..BrowserSettings::default()
        };
        let args = build_chrome_arguments(&settings);
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn extra_args_are_appended_last() {
        let settings = BrowserSettings {
            headless: false,
            extra_args: vec!["--lang=en-US".to_string()],
            ..BrowserSettings::default()
        };
        let args = build_chrome_arguments(&settings);
        assert!(!args.iter().any(|a| a == "--headless"));
        assert_eq!(args.last().map(String::as_str), Some("--lang=en-US"));
    }
}
