use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Placeholder used when the provider knows neither a name nor a currency.
pub const UNKNOWN: &str = "Unknown";

/// Static per-ticker data, fetched once and cached for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerMetadata {
    pub company_name: String,
    pub currency: String,
}

impl TickerMetadata {
    pub fn new(company_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            currency: currency.into(),
        }
    }

    /// Build metadata from whatever the provider returned.
    ///
    /// Name fallback order: long name, short name, `"Unknown"`.
    /// Blank strings count as missing.
    pub fn from_provider_fields(
        long_name: Option<String>,
        short_name: Option<String>,
        currency: Option<String>,
    ) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let company_name = present(long_name)
            .or_else(|| present(short_name))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let currency = present(currency)
            .map(|c| c.trim().to_uppercase())
            .unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            company_name,
            currency,
        }
    }

    pub fn is_usd(&self) -> bool {
        self.currency == "USD"
    }
}

/// Ticker ids already seen during a run, in first-seen order.
///
/// Grows monotonically across every portfolio file of the run. Updates go
/// through `services::ticker_tracker`, which returns a new set instead of
/// mutating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl TickerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Keys in the order they were added.
    pub fn keys(&self) -> &[String] {
        &self.ordered
    }

    pub(crate) fn with_key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.insert(key);
        next
    }

    pub(crate) fn insert(&mut self, key: &str) {
        if self.seen.insert(key.to_string()) {
            self.ordered.push(key.to_string());
        }
    }
}
