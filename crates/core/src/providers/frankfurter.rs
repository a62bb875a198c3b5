use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::FxRateProvider;
use crate::errors::CoreError;

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Frankfurter API provider for EUR/USD (and other fiat) reference rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data, published on TARGET
///   business days only.
///
/// For a non-publishing day Frankfurter answers with the previous business
/// day's rate; such answers are rejected because the pipeline works on exact
/// dates.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at another Frankfurter instance (self-hosted or a
    /// test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of the single-day endpoint for `base`→`quote` on `date`.
    pub fn rate_url(&self, base: &str, quote: &str, date: NaiveDate) -> String {
        format!(
            "{}/{}?base={}&symbols={}",
            self.base_url,
            date.format("%Y-%m-%d"),
            base.to_uppercase(),
            quote.to_uppercase()
        )
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub date: String,
    pub rates: HashMap<String, f64>,
}

impl RatesResponse {
    /// The rate for `quote`, provided the response is for exactly `date`.
    pub fn rate_on(&self, quote: &str, date: NaiveDate) -> Option<f64> {
        let published = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        if published != date {
            return None;
        }
        self.rates
            .get(&quote.to_uppercase())
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }
}

#[async_trait]
impl FxRateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    async fn get_rate(&self, base: &str, quote: &str, date: NaiveDate) -> Result<f64, CoreError> {
        if base.eq_ignore_ascii_case(quote) {
            return Ok(1.0);
        }

        let pair = format!("{}/{}", base.to_uppercase(), quote.to_uppercase());
        let url = self.rate_url(base, quote, date);

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse rate for {pair} on {date}: {e}"),
            })?;

        resp.rate_on(quote, date)
            .ok_or_else(|| CoreError::DataUnavailable {
                symbol: pair,
                date: date.to_string(),
            })
    }
}
