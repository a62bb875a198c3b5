use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api::YahooConnector;

use super::traits::{FxRateProvider, QuoteProvider};
use crate::errors::CoreError;
use crate::models::ticker::TickerMetadata;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance provider for daily stock closes, ticker metadata and FX
/// rates (`EURUSD=X` style symbols).
///
/// - **Free**: No API key required.
/// - **Data**: full daily history in the instrument's native currency.
///
/// Bars are matched on the exchange-local calendar day, so a request for a
/// Saturday finds nothing instead of Friday's close. The day of each bar is
/// taken in the exchange's time zone as it was when the bar was stamped;
/// the response's `gmtoffset` is only a fallback for unknown zone names.
pub struct YahooFinanceProvider {
    connector: YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Yahoo's symbol for a currency pair, e.g. `EURUSD=X`.
    pub fn fx_symbol(base: &str, quote: &str) -> String {
        format!("{}{}=X", base.to_uppercase(), quote.to_uppercase())
    }

    /// Midnight UTC of `date` as a `time::OffsetDateTime`.
    fn midnight_utc(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let invalid = |e: String| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid date {date}: {e}"),
        };
        let month = time::Month::try_from(date.month() as u8).map_err(|e| invalid(e.to_string()))?;
        let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(day.midnight().assume_utc())
    }

    /// Calendar day of a bar timestamp in the exchange's own time zone.
    ///
    /// `gmtoffset` is the exchange's offset at request time and is used only
    /// when `zone` is unknown.
    fn local_date(timestamp: i64, zone: Option<Tz>, gmtoffset: i64) -> Option<NaiveDate> {
        match zone {
            Some(tz) => chrono::DateTime::from_timestamp(timestamp, 0)
                .map(|dt| dt.with_timezone(&tz).date_naive()),
            None => chrono::DateTime::from_timestamp(timestamp + gmtoffset, 0)
                .map(|dt| dt.date_naive()),
        }
    }

    async fn close_on(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError> {
        let unavailable = || CoreError::DataUnavailable {
            symbol: symbol.to_string(),
            date: date.to_string(),
        };

        // A one-day margin on both sides covers any exchange UTC offset.
        let start = Self::midnight_utc(date - Duration::days(1))?;
        let end = Self::midnight_utc(date + Duration::days(2))?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| {
                debug!(%symbol, %date, error = %e, "quote history request failed");
                unavailable()
            })?;

        let (zone, gmtoffset) = match resp.metadata() {
            Ok(meta) => (
                meta.exchange_timezone_name.parse::<Tz>().ok(),
                i64::from(meta.gmtoffset),
            ),
            Err(_) => (None, 0),
        };
        let quotes = resp.quotes().map_err(|e| {
            debug!(%symbol, %date, error = %e, "no quotes in response");
            unavailable()
        })?;

        quotes
            .iter()
            .find(|q| Self::local_date(q.timestamp as i64, zone, gmtoffset) == Some(date))
            .map(|q| q.close)
            .filter(|close| close.is_finite() && *close > 0.0)
            .ok_or_else(unavailable)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_closing_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError> {
        self.close_on(symbol, date).await
    }

    async fn get_metadata(&self, symbol: &str) -> Result<TickerMetadata, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch metadata for {symbol}: {e}"),
            })?;

        let meta = resp.metadata().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No metadata for {symbol}: {e}"),
        })?;

        Ok(TickerMetadata::from_provider_fields(
            meta.long_name.clone(),
            meta.short_name.clone(),
            meta.currency.clone(),
        ))
    }
}

#[async_trait]
impl FxRateProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_rate(&self, base: &str, quote: &str, date: NaiveDate) -> Result<f64, CoreError> {
        if base.eq_ignore_ascii_case(quote) {
            return Ok(1.0);
        }
        self.close_on(&Self::fx_symbol(base, quote), date).await
    }
}
