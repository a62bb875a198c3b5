use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names a portfolio file must declare in its header row.
pub const TICKER_ID_COLUMN: &str = "ticker_id";
pub const BUY_DATE_COLUMN: &str = "buy_date";
pub const INVESTMENT_EUR_COLUMN: &str = "investment_eur";

/// A portfolio line exactly as read from the file, before validation.
///
/// Empty cells are `None`. Validation (and parsing of the date and amount)
/// happens in `RowEvaluator` so that a bad line only fails its own row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPortfolioRow {
    /// Zero-based position among the data lines (header and comments excluded)
    pub index: usize,
    pub ticker_id: Option<String>,
    pub buy_date: Option<String>,
    pub investment_eur: Option<String>,
}

impl RawPortfolioRow {
    pub fn new(
        index: usize,
        ticker_id: impl Into<String>,
        buy_date: impl Into<String>,
        investment_eur: impl Into<String>,
    ) -> Self {
        Self {
            index,
            ticker_id: non_empty(ticker_id.into()),
            buy_date: non_empty(buy_date.into()),
            investment_eur: non_empty(investment_eur.into()),
        }
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A validated stock purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    /// Yahoo-style symbol, e.g. "AAPL"
    pub ticker_id: String,

    /// Day the position was bought
    pub buy_date: NaiveDate,

    /// Amount invested, in euros (finite, > 0)
    pub investment_eur: f64,
}
