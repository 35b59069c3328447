use crate::pipeline::{Backend, Pipeline, report_from_file};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use scout_common::ScoutError;
use scout_common::observability::{LogConfig, LogFormat};
use scout_config::{LoggingSettings, ScoutConfig, ScoutConfigLoader};
use std::path::PathBuf;

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "scout.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "scout",
    version,
    about = "Scrape a discussions listing, classify it, and report"
)]
pub struct Cli {
    /// YAML config file (must exist when given)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,

    /// Saved HTML page to read instead of rendering; implies `--backend snapshot`
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Listing page to scrape
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Number of discussions in the per-item listing
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    /// Recency window for `fetch`, in days
    #[arg(long, global = true)]
    pub days: Option<u32>,

    /// JSON file written by `fetch` and `analyze --save`
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Browser,
    Http,
    Snapshot,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save discussions from the recency window and show the newest one
    Fetch,
    /// Classify every discussion and print the analysis report
    Analyze {
        /// Also write the analyzed list to the output file
        #[arg(long)]
        save: bool,
    },
    /// Show only the most recent discussion
    Latest,
    /// Report on a previously saved file without touching the network
    Report {
        /// Defaults to the configured output file
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    pub fn backend(&self) -> Result<Backend> {
        match (&self.snapshot, self.backend) {
            (Some(path), _) => Ok(Backend::Snapshot(path.clone())),
            (None, Some(BackendKind::Snapshot)) => {
                bail!("--backend snapshot needs --snapshot <file.html>")
            }
            (None, Some(BackendKind::Http)) => Ok(Backend::Http),
            (None, Some(BackendKind::Browser) | None) => Ok(Backend::Browser),
        }
    }

    /// File and environment layers first, then command-line overrides.
    pub fn load_config(&self) -> Result<ScoutConfig> {
        let loader = match &self.config {
            Some(path) => ScoutConfigLoader::new().with_file(path),
            None => ScoutConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
        };
        let mut cfg = loader
            .load()
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        self.apply_overrides(&mut cfg);
        cfg.validate()
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        Ok(cfg)
    }

    pub fn apply_overrides(&self, cfg: &mut ScoutConfig) {
        if let Some(url) = &self.url {
            cfg.target.url = url.clone();
        }
        if let Some(limit) = self.limit {
            cfg.output.listing_limit = limit;
        }
        if let Some(days) = self.days {
            cfg.output.recent_days = days;
        }
        if let Some(output) = &self.output {
            cfg.output.path = output.clone();
        }
    }

    pub fn log_config(&self, settings: &LoggingSettings) -> LogConfig {
        let format = if self.json_logs {
            LogFormat::Json
        } else {
            settings.format.parse().unwrap_or(LogFormat::Text)
        };
        LogConfig {
            log_dir: settings.dir.clone(),
            emit_stderr: settings.stderr,
            format,
            default_filter: settings.filter.clone(),
            ..LogConfig::default()
        }
    }

    /// Run the selected command, returning the text to print.
    pub async fn execute(&self, cfg: ScoutConfig, now: DateTime<Utc>) -> Result<String> {
        match &self.command {
            Command::Report { input } => {
                let path = input.as_ref().unwrap_or(&cfg.output.path);
                report_from_file(path, cfg.output.listing_limit)
            }
            Command::Fetch => self.pipeline(cfg)?.fetch(now).await,
            Command::Analyze { save } => self.pipeline(cfg)?.analyze(*save).await,
            Command::Latest => self.pipeline(cfg)?.latest().await,
        }
    }

    fn pipeline(&self, cfg: ScoutConfig) -> Result<Pipeline> {
        Pipeline::with_backend(cfg, &self.backend()?)
    }
}
