use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::frankfurter::FrankfurterProvider;
use super::traits::{FxRateProvider, PriceProvider, QuoteProvider};
use super::yahoo_finance::YahooFinanceProvider;
use crate::errors::CoreError;
use crate::models::settings::{FxSource, Settings};
use crate::models::ticker::TickerMetadata;

/// Label used for every failed EUR→USD lookup, whatever the FX source.
pub const EUR_USD: &str = "EUR/USD";

/// Combines one quote source and one FX source into a `PriceProvider`.
///
/// Price and rate failures of the underlying sources (transport, API or
/// missing bar) all come out as `DataUnavailable` for the requested date.
///
/// Ticker metadata never changes during a run, so it is fetched once per
/// ticker and served from memory afterwards. Prices and rates are not cached.
pub struct MarketDataProvider {
    quotes: Box<dyn QuoteProvider>,
    fx: Box<dyn FxRateProvider>,
    metadata_cache: Mutex<HashMap<String, TickerMetadata>>,
    name: String,
}

impl MarketDataProvider {
    pub fn new(quotes: Box<dyn QuoteProvider>, fx: Box<dyn FxRateProvider>) -> Self {
        let name = format!("{} + {}", quotes.name(), fx.name());
        Self {
            quotes,
            fx,
            metadata_cache: Mutex::new(HashMap::new()),
            name,
        }
    }

    /// Yahoo Finance for quotes, FX from whichever source the settings pick.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let quotes = Box::new(YahooFinanceProvider::new()?);
        let fx: Box<dyn FxRateProvider> = match settings.fx_source {
            FxSource::Yahoo => Box::new(YahooFinanceProvider::new()?),
            FxSource::Frankfurter => Box::new(FrankfurterProvider::new()),
        };
        Ok(Self::new(quotes, fx))
    }

    /// Number of tickers whose metadata is cached.
    pub fn cached_metadata_count(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, TickerMetadata>> {
        // The map is only ever inserted into; a poisoned lock still holds valid data.
        self.metadata_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PriceProvider for MarketDataProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_closing_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError> {
        self.quotes
            .get_closing_price(symbol, date)
            .await
            .map_err(|e| e.into_unavailable(symbol, date))
    }

    async fn get_eur_usd_rate(&self, date: NaiveDate) -> Result<f64, CoreError> {
        self.fx
            .get_rate("EUR", "USD", date)
            .await
            .map_err(|e| e.into_unavailable(EUR_USD, date))
    }

    async fn get_metadata(&self, symbol: &str) -> Result<TickerMetadata, CoreError> {
        let cached = self.cache().get(symbol).cloned();
        if let Some(metadata) = cached {
            debug!(%symbol, "metadata cache hit");
            return Ok(metadata);
        }

        let metadata = self.quotes.get_metadata(symbol).await?;
        self.cache().insert(symbol.to_string(), metadata.clone());
        Ok(metadata)
    }
}
