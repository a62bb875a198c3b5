use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use stock_report_core::models::settings::{FxSource, Settings};
use stock_report_core::providers::market_data::MarketDataProvider;
use stock_report_core::services::run_driver::RunDriver;
use stock_report_core::StockReporter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Investment reports for lists of portfolio files")]
struct Cli {
    /// Text file listing one portfolio file per line
    #[arg(long)]
    list: PathBuf,

    /// Valuation day (YYYY-MM-DD); defaults to today minus the configured offset
    #[arg(long)]
    sell_date: Option<NaiveDate>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the EUR/USD source (yahoo | frankfurter)
    #[arg(long)]
    fx_source: Option<FxSource>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(fx_source) = cli.fx_source {
        settings.fx_source = fx_source;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_target(false)
        .init();

    let sell_date = cli
        .sell_date
        .unwrap_or_else(|| settings.default_sell_date(Local::now().date_naive()));

    let paths = RunDriver::read_list_file(&cli.list)
        .with_context(|| format!("failed to read portfolio list {}", cli.list.display()))?;
    info!(files = paths.len(), %sell_date, fx = %settings.fx_source, "starting run");

    let provider = MarketDataProvider::from_settings(&settings)?;
    let mut reporter = StockReporter::new(Box::new(provider));
    let summary = reporter.run(&paths, sell_date).await;

    if !summary.is_clean() {
        warn!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "run finished with failed portfolio files"
        );
    }
    Ok(())
}
