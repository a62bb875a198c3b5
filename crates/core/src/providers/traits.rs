use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::ticker::TickerMetadata;

/// Everything the valuation pipeline needs from market data.
///
/// Lookups are point-in-time: a date without a trading session (weekend,
/// holiday) is an error, never the nearest session's value. Callers await one
/// query at a time.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Closing price of `symbol` on exactly `date`, in the symbol's currency.
    async fn get_closing_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError>;

    /// How many USD one EUR bought on exactly `date`.
    async fn get_eur_usd_rate(&self, date: NaiveDate) -> Result<f64, CoreError>;

    /// Company name and trading currency of `symbol`.
    async fn get_metadata(&self, symbol: &str) -> Result<TickerMetadata, CoreError>;
}

/// A source of daily stock quotes and ticker metadata.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn get_closing_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError>;

    async fn get_metadata(&self, symbol: &str) -> Result<TickerMetadata, CoreError>;
}

/// A source of daily foreign-exchange rates.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Units of `quote` per one unit of `base` on exactly `date`.
    async fn get_rate(&self, base: &str, quote: &str, date: NaiveDate) -> Result<f64, CoreError>;
}
