use anyhow::Result;
use clap::Parser;
use scout_app::cli::Cli;
use scout_common::observability::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins, then CLI flags)
    let cfg = cli.load_config()?;

    let log_path = init_logging(cli.log_config(&cfg.logging))?;
    tracing::debug!(target: "scout.app", log = %log_path.display(), "logging initialised");

    let report = cli.execute(cfg, chrono::Utc::now()).await?;
    print!("{report}");
    Ok(())
}
