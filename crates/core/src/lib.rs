pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use errors::CoreError;
use models::report::{PortfolioSummary, RowOutcome};
use models::ticker::TickerSet;
use providers::traits::PriceProvider;
use services::{
    portfolio_aggregator::PortfolioAggregator,
    portfolio_reader::PortfolioReader,
    report_writer::{report_path_for, ReportWriter},
    row_evaluator::RowEvaluator,
};

/// Outcome of a whole run over several portfolio files.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Portfolio files whose report was written completely
    pub succeeded: Vec<PathBuf>,
    /// Portfolio files that failed, with the error that stopped them
    pub failed: Vec<(PathBuf, CoreError)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Main entry point for the stock-report core library.
///
/// Holds the price provider and the set of tickers seen so far in this run.
/// Portfolio files are processed one after another, each row to completion
/// before the next.
#[must_use]
pub struct StockReporter {
    provider: Box<dyn PriceProvider>,
    evaluator: RowEvaluator,
    tickers: TickerSet,
}

impl std::fmt::Debug for StockReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockReporter")
            .field("provider", &self.provider.name())
            .field("tickers_seen", &self.tickers.len())
            .finish()
    }
}

impl StockReporter {
    pub fn new(provider: Box<dyn PriceProvider>) -> Self {
        Self {
            provider,
            evaluator: RowEvaluator::new(),
            tickers: TickerSet::new(),
        }
    }

    /// Tickers claimed so far, across every file processed by this reporter.
    #[must_use]
    pub fn tickers(&self) -> &TickerSet {
        &self.tickers
    }

    /// Produce the report for every file in `paths`, in order.
    ///
    /// A failing file is logged and recorded in the returned summary; the
    /// remaining files are still processed.
    pub async fn run(&mut self, paths: &[PathBuf], sell_date: NaiveDate) -> RunSummary {
        let mut summary = RunSummary::default();
        for path in paths {
            info!("Processing Stockfile: {}", path.display());
            match self.process_portfolio_file(path, sell_date).await {
                Ok(_) => summary.succeeded.push(path.clone()),
                Err(e) => {
                    error!(
                        "Error processing {} for date {sell_date}: {e}",
                        path.display()
                    );
                    summary.failed.push((path.clone(), e));
                }
            }
        }
        summary
    }

    /// Value one portfolio file and write its report.
    ///
    /// Row-level failures become report lines. The file itself fails on I/O
    /// and format errors, and with `NoSuccessfulRows` when nothing could be
    /// valued (the partial report stays on disk). Tickers claimed by rows of a
    /// failed file stay claimed.
    pub async fn process_portfolio_file(
        &mut self,
        path: &Path,
        sell_date: NaiveDate,
    ) -> Result<PortfolioSummary, CoreError> {
        let report_path = report_path_for(path, sell_date);
        if let Some(base) = report_path.parent().and_then(Path::parent).and_then(Path::parent) {
            info!("Stock base folder: {}", base.display());
        }
        info!("Generating report: {}", report_path.display());

        let rows = PortfolioReader::read_file(path)?;
        let mut writer = ReportWriter::create(&report_path)?;
        let mut aggregator = PortfolioAggregator::new(sell_date);

        for raw in &rows {
            let RowOutcome { buy_date, result } = self
                .evaluator
                .evaluate_raw(raw, sell_date, self.provider.as_ref(), &mut self.tickers)
                .await;
            let result = match result {
                Err(e) if !e.is_row_level() => {
                    warn!(row = raw.index, error = %e, "aborting portfolio file");
                    return Err(e);
                }
                other => other,
            };
            aggregator.record(RowOutcome { buy_date, result }, &mut writer)?;
        }

        let summary = aggregator.finalize();
        writer.write_summary(&summary)?;
        Ok(summary)
    }
}
