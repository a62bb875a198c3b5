use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::CoreError;
use crate::models::report::{Performance, PortfolioSummary, RowResult};

/// Directory, next to the portfolio folders, that holds all reports.
pub const REPORTS_DIR: &str = "reports";

/// Where the report for `portfolio_path` and `sell_date` is written:
///
/// `<grandparent of portfolio file>/reports/<file stem>/investment-report-<sell date>.txt`
///
/// e.g. `stocks/files/tech.csv` → `stocks/reports/tech/investment-report-2023-06-01.txt`.
pub fn report_path_for(portfolio_path: &Path, sell_date: NaiveDate) -> PathBuf {
    let base = portfolio_path
        .parent()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    let stem = portfolio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.join(REPORTS_DIR)
        .join(stem)
        .join(format!("investment-report-{}.txt", sell_date.format("%Y-%m-%d")))
}

/// Renders a report line by line: each line is logged (target `report`) and
/// then written to the output.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl ReportWriter<File> {
    /// Create (or truncate) the report file, creating missing directories.
    pub fn create(path: &Path) -> Result<Self, CoreError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| CoreError::FileIO(format!("{}: {e}", dir.display())))?;
        }
        let file = File::create(path)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", path.display())))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Log `line`, then append it to the report. Flushed on every call.
    pub fn emit(&mut self, line: &str) -> Result<(), CoreError> {
        info!(target: "report", "{line}");
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn write_row(&mut self, row: &RowResult) -> Result<(), CoreError> {
        self.emit(&format_row(row))
    }

    /// Write the summary block. If no row succeeded the block stops after the
    /// total-invested line and `NoSuccessfulRows` is returned.
    pub fn write_summary(&mut self, summary: &PortfolioSummary) -> Result<(), CoreError> {
        self.emit("")?;
        self.emit(&format!("Total number of stocks: {}", summary.stock_count))?;
        self.emit(&format!("Best performers: {}", join_performances(&summary.best)))?;
        self.emit(&format!("Worst performers: {}", join_performances(&summary.worst)))?;
        self.emit(&format!(
            "Total invested: {:.0}$ ({:.0}€)",
            summary.total_invested_usd, summary.total_invested_eur
        ))?;

        let average = summary.average_pct()?;
        self.emit(&format!("Total average percentage: {average:.2}%"))?;
        self.emit(&format!(
            "Total Investments today: {:.0}$ ({:.0}€)",
            summary.total_worth_usd(),
            summary.total_worth_eur()
        ))?;

        // A successful row always has a buy date, so this is set here.
        let days = summary.days_held().ok_or(CoreError::NoSuccessfulRows)?;
        self.emit("")?;
        self.emit(&format!(
            "Total profit in {days} days: {:.0}$ ({:.0}€)",
            summary.total_profit_usd,
            summary.total_profit_eur()
        ))
    }
}

/// The report line of a successfully valued row.
pub fn format_row(row: &RowResult) -> String {
    format!(
        "Ticker: {}, Company: \"{}\", Currency: {}, euro_to_usd_rate_on_buy_date: {:.2}, \
         buy_stock_price: {:.2}, sell_stock_price: {:.2}, Increased Percentage: {:.0}%, Profit: {:.0}$",
        row.ticker_id,
        row.company_name,
        row.currency,
        row.eur_usd_rate_on_buy_date,
        row.buy_price,
        row.sell_price,
        row.pct_change,
        row.profit_usd
    )
}

fn join_performances(list: &[Performance]) -> String {
    list.iter()
        .map(Performance::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
