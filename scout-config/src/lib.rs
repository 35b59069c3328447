//! Loader for scout configuration with YAML + environment overlays.
//!
//! Precedence, lowest first: serde defaults, YAML files and inline snippets
//! (in the order they were attached), then `SCOUT_`-prefixed environment
//! variables using `__` to address nested keys (`SCOUT_OUTPUT__RECENT_DAYS=7`).
//! `${VAR}` placeholders in any string value are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_TARGET_URL: &str =
    "https://github.com/orgs/community/discussions/categories/models";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub version: Option<String>,
    pub target: TargetSettings,
    pub browser: BrowserSettings,
    /// Tried in order; the first profile matching any item wins.
    pub selectors: Vec<SelectorProfile>,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            version: None,
            target: TargetSettings::default(),
            browser: BrowserSettings::default(),
            selectors: default_selector_profiles(),
            output: OutputSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// The listing page and how long we are willing to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    pub url: String,
    /// Selector the browser backend waits for before reading the page.
    pub item_wait_selector: String,
    pub navigation_timeout_secs: u64,
    pub wait_timeout_secs: u64,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            item_wait_selector: "li.Box-row.js-navigation-item".to_string(),
            navigation_timeout_secs: 30,
            wait_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    /// Extra Chrome command-line switches appended to the defaults.
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            extra_args: Vec::new(),
        }
    }
}

/// CSS selectors describing one page layout.
///
/// `item` scopes each discussion; the other selectors are evaluated inside
/// an item. Optional selectors that are `None` never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorProfile {
    pub name: String,
    pub item: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl SelectorProfile {
    /// GitHub's server-rendered discussion list.
    pub fn box_row() -> Self {
        Self {
            name: "box-row".to_string(),
            item: "li.Box-row.js-navigation-item".to_string(),
            title: "a.markdown-title.discussion-Link--secondary".to_string(),
            author: Some(
                r#"a.Link--muted.Link--inTextBlock[href^="/"][aria-label*="author"]"#.to_string(),
            ),
            timestamp: Some("relative-time".to_string()),
            comments: Some(r#"a[aria-label*="comment"]"#.to_string()),
        }
    }

    /// Layout with `data-testid` markers.
    pub fn testid() -> Self {
        Self {
            name: "testid".to_string(),
            item: r#"[data-testid="discussion-item"]"#.to_string(),
            title: r#"a[href*="/discussions/"]"#.to_string(),
            author: Some(r#"a[data-hovercard-type="user"]"#.to_string()),
            timestamp: Some("relative-time".to_string()),
            comments: Some(r#"a[aria-label*="comment"]"#.to_string()),
        }
    }
}

pub fn default_selector_profiles() -> Vec<SelectorProfile> {
    vec![SelectorProfile::box_row(), SelectorProfile::testid()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub path: PathBuf,
    /// Recency window applied by `fetch`, in days.
    pub recent_days: u32,
    /// Number of items shown in the per-item listing of the analysis report.
    pub listing_limit: usize,
    pub debug_screenshot: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("discussions.json"),
            recent_days: 30,
            listing_limit: 10,
            debug_screenshot: PathBuf::from("debug-screenshot.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `text` or `json`.
    pub format: String,
    pub stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            stderr: true,
            filter: "info".to_string(),
            dir: None,
        }
    }
}

impl ScoutConfig {
    /// Check the invariants the rest of the workspace relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.target.url).map_err(|e| {
            ConfigError::Message(format!("target.url `{}` is not a URL: {e}", self.target.url))
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::Message(format!(
                "target.url `{}` must be an absolute http(s) URL",
                self.target.url
            )));
        }
        if self.selectors.is_empty() {
            return Err(ConfigError::Message(
                "selectors: at least one profile is required".into(),
            ));
        }
        for profile in &self.selectors {
            if profile.item.trim().is_empty() || profile.title.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "selectors.{}: `item` and `title` must not be empty",
                    profile.name
                )));
            }
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ScoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ScoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutConfigLoader {
    /// Start from the built-in defaults.
    ///
    /// ```
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.output.recent_days, 30);
    /// assert_eq!(config.selectors.len(), 2);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let cfg = ScoutConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// selectors:
    ///   - name: "plain"
    ///     item: "li.discussion"
    ///     title: "a.title"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.selectors.len(), 1);
    /// assert_eq!(cfg.selectors[0].author, None);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    pub fn load(self) -> Result<ScoutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: ScoutConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
