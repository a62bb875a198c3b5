use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::portfolio::{PortfolioRow, RawPortfolioRow};
use crate::models::report::{RowOutcome, RowResult};
use crate::models::ticker::TickerSet;
use crate::providers::market_data::EUR_USD;
use crate::providers::traits::PriceProvider;
use super::ticker_tracker::UniqueKeyTracker;

/// Values a single portfolio row between its buy date and the sell date.
///
/// Order of work per row:
/// 1. ticker id present, then registered in the run's `TickerSet` (so a row
///    that fails later still claims its ticker)
/// 2. buy date and invested amount validated
/// 3. ticker currency must be USD
/// 4. EUR→USD on the buy date and the sell date, closing prices on both dates
///
/// Every failure is returned inside the `RowOutcome`; nothing here aborts the
/// portfolio.
pub struct RowEvaluator;

impl RowEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw row and claim its ticker in `tickers`.
    ///
    /// On success `tickers` is replaced by the set returned from
    /// `UniqueKeyTracker::add`. The second value is the buy date, whenever it
    /// could be parsed, even if a later check failed.
    pub fn validate(
        &self,
        raw: &RawPortfolioRow,
        sell_date: NaiveDate,
        tickers: &mut TickerSet,
    ) -> (Option<NaiveDate>, Result<PortfolioRow, CoreError>) {
        let row = raw.index;

        let ticker_id = match raw.ticker_id.as_deref() {
            Some(id) => id.to_string(),
            None => {
                return (
                    None,
                    Err(CoreError::ValidationError(format!(
                        "Missing ticker_id in row {row}."
                    ))),
                )
            }
        };

        match UniqueKeyTracker::add(tickers, &ticker_id) {
            Ok(next) => *tickers = next,
            Err(e) => return (None, Err(e)),
        }

        let buy_date = match Self::parse_buy_date(raw, &ticker_id) {
            Ok(date) => date,
            Err(e) => return (None, Err(e)),
        };

        let checked = Self::parse_investment(raw, &ticker_id).and_then(|investment_eur| {
            if buy_date >= sell_date {
                return Err(CoreError::ValidationError(format!(
                    "buy_date {buy_date} is not before sell date {sell_date} for ticker {ticker_id} in row {row}."
                )));
            }
            Ok(PortfolioRow {
                ticker_id: ticker_id.clone(),
                buy_date,
                investment_eur,
            })
        });

        (Some(buy_date), checked)
    }

    /// Value a validated row. Fails with `UnsupportedCurrency` for non-USD
    /// tickers and `DataUnavailable` when metadata, a price or a rate cannot
    /// be had from the provider. A metadata failure is reported on the buy
    /// date.
    pub async fn evaluate(
        &self,
        row: &PortfolioRow,
        sell_date: NaiveDate,
        provider: &dyn PriceProvider,
    ) -> Result<RowResult, CoreError> {
        let ticker_id = row.ticker_id.as_str();

        let metadata = provider
            .get_metadata(ticker_id)
            .await
            .map_err(|e| e.into_unavailable(ticker_id, row.buy_date))?;
        if !metadata.is_usd() {
            return Err(CoreError::UnsupportedCurrency {
                ticker: ticker_id.to_string(),
                currency: metadata.currency,
            });
        }

        let eur_usd_rate_on_buy_date = provider
            .get_eur_usd_rate(row.buy_date)
            .await
            .map_err(|e| e.into_unavailable(EUR_USD, row.buy_date))?;
        let eur_usd_rate_on_sell_date = provider
            .get_eur_usd_rate(sell_date)
            .await
            .map_err(|e| e.into_unavailable(EUR_USD, sell_date))?;
        let invested_usd = row.investment_eur * eur_usd_rate_on_buy_date;

        let buy_price = provider
            .get_closing_price(ticker_id, row.buy_date)
            .await
            .map_err(|e| e.into_unavailable(ticker_id, row.buy_date))?;
        let sell_price = provider
            .get_closing_price(ticker_id, sell_date)
            .await
            .map_err(|e| e.into_unavailable(ticker_id, sell_date))?;
        if !(buy_price.is_finite() && buy_price > 0.0) {
            return Err(CoreError::DataUnavailable {
                symbol: ticker_id.to_string(),
                date: row.buy_date.to_string(),
            });
        }

        let ratio = sell_price / buy_price;
        let sold_usd = invested_usd * ratio;

        Ok(RowResult {
            ticker_id: ticker_id.to_string(),
            company_name: metadata.company_name,
            currency: metadata.currency,
            eur_usd_rate_on_buy_date,
            usd_eur_rate_on_sell_date: 1.0 / eur_usd_rate_on_sell_date,
            buy_price,
            sell_price,
            invested_eur: row.investment_eur,
            invested_usd,
            sold_usd,
            profit_usd: sold_usd - invested_usd,
            pct_change: (ratio - 1.0) * 100.0,
        })
    }

    /// `validate` followed by `evaluate`, folded into one `RowOutcome`.
    pub async fn evaluate_raw(
        &self,
        raw: &RawPortfolioRow,
        sell_date: NaiveDate,
        provider: &dyn PriceProvider,
        tickers: &mut TickerSet,
    ) -> RowOutcome {
        let (buy_date, validated) = self.validate(raw, sell_date, tickers);
        let result = match validated {
            Ok(row) => self.evaluate(&row, sell_date, provider).await,
            Err(e) => Err(e),
        };
        RowOutcome { buy_date, result }
    }

    fn parse_buy_date(raw: &RawPortfolioRow, ticker_id: &str) -> Result<NaiveDate, CoreError> {
        let row = raw.index;
        let text = raw.buy_date.as_deref().ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Missing buy_date for ticker {ticker_id} in row {row}."
            ))
        })?;
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            CoreError::ValidationError(format!(
                "Invalid buy_date '{text}' for ticker {ticker_id} in row {row}, expected YYYY-MM-DD."
            ))
        })
    }

    fn parse_investment(raw: &RawPortfolioRow, ticker_id: &str) -> Result<f64, CoreError> {
        let row = raw.index;
        let text = raw.investment_eur.as_deref().ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Missing investment_eur for ticker {ticker_id} in row {row}."
            ))
        })?;
        match text.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
            _ => Err(CoreError::ValidationError(format!(
                "Invalid investment_eur '{text}' for ticker {ticker_id} in row {row}, expected a positive number."
            ))),
        }
    }
}

impl Default for RowEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
