use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// How many entries the best/worst performer lists hold.
pub const RANKING_SIZE: usize = 3;

/// Valuation of one portfolio row between its buy date and the sell date.
///
/// Numbers keep full `f64` precision; rounding is left to `ReportWriter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    pub ticker_id: String,
    pub company_name: String,
    pub currency: String,

    /// EUR→USD rate on the buy date
    pub eur_usd_rate_on_buy_date: f64,

    /// USD→EUR rate on the sell date (reciprocal of that day's EUR→USD rate)
    pub usd_eur_rate_on_sell_date: f64,

    pub buy_price: f64,
    pub sell_price: f64,

    pub invested_eur: f64,
    pub invested_usd: f64,
    pub sold_usd: f64,
    pub profit_usd: f64,

    /// `(sell_price / buy_price - 1) * 100`
    pub pct_change: f64,
}

impl RowResult {
    pub fn sold_eur(&self) -> f64 {
        self.sold_usd * self.usd_eur_rate_on_sell_date
    }
}

/// What evaluating one row produced.
///
/// `buy_date` is the buy date read from the row, if evaluation got that far,
/// regardless of whether the row as a whole succeeded.
#[derive(Debug)]
pub struct RowOutcome {
    pub buy_date: Option<NaiveDate>,
    pub result: Result<RowResult, CoreError>,
}

impl RowOutcome {
    pub fn failed(buy_date: Option<NaiveDate>, error: CoreError) -> Self {
        Self {
            buy_date,
            result: Err(error),
        }
    }
}

/// A ticker's percentage change, used for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub ticker_id: String,
    pub pct_change: f64,
}

impl std::fmt::Display for Performance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:+.1}%)", self.ticker_id, self.pct_change)
    }
}

/// Finalized totals and rankings of one portfolio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub sell_date: NaiveDate,

    /// Rows that were valued successfully
    pub stock_count: usize,

    pub total_invested_eur: f64,
    pub total_invested_usd: f64,
    pub total_profit_usd: f64,
    pub total_pct_change: f64,

    /// USD→EUR rate on the sell date as seen by the last successful row
    /// (0.0 if no row succeeded)
    pub usd_eur_rate_on_sell_date: f64,

    /// Successful rows, sorted by `pct_change` descending; equal values keep
    /// file order
    pub performances: Vec<Performance>,

    /// First `RANKING_SIZE` entries of `performances`
    pub best: Vec<Performance>,

    /// Last `RANKING_SIZE` entries of `performances`. With `RANKING_SIZE` rows
    /// or fewer this overlaps `best`.
    pub worst: Vec<Performance>,

    /// Buy date of the last row (in file order) whose buy date was read,
    /// whether or not that row succeeded. The headline holding period is
    /// measured from this date only.
    pub last_row_buy_date_used_for_duration: Option<NaiveDate>,
}

impl PortfolioSummary {
    /// Mean of the per-row percentage changes.
    pub fn average_pct(&self) -> Result<f64, CoreError> {
        if self.stock_count == 0 {
            return Err(CoreError::NoSuccessfulRows);
        }
        Ok(self.total_pct_change / self.stock_count as f64)
    }

    pub fn total_worth_usd(&self) -> f64 {
        self.total_invested_usd + self.total_profit_usd
    }

    pub fn total_worth_eur(&self) -> f64 {
        self.total_worth_usd() * self.usd_eur_rate_on_sell_date
    }

    pub fn total_profit_eur(&self) -> f64 {
        self.total_profit_usd * self.usd_eur_rate_on_sell_date
    }

    /// Days between `last_row_buy_date_used_for_duration` and the sell date.
    pub fn days_held(&self) -> Option<i64> {
        self.last_row_buy_date_used_for_duration
            .map(|buy| (self.sell_date - buy).num_days())
    }
}
