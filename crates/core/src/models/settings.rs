use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CoreError;

/// Where EUR/USD rates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FxSource {
    /// Daily close of Yahoo's `EURUSD=X` series
    Yahoo,
    /// ECB reference rates via the Frankfurter API
    Frankfurter,
}

impl std::fmt::Display for FxSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FxSource::Yahoo => write!(f, "yahoo"),
            FxSource::Frankfurter => write!(f, "frankfurter"),
        }
    }
}

impl std::str::FromStr for FxSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(FxSource::Yahoo),
            "frankfurter" => Ok(FxSource::Frankfurter),
            other => Err(CoreError::Config(format!("Unknown FX source: {other}"))),
        }
    }
}

/// Run settings, optionally loaded from a JSON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Source of EUR/USD rates
    pub fx_source: FxSource,

    /// The sell date is today minus this many days when none is given
    pub sell_date_offset_days: i64,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fx_source: FxSource::Yahoo,
            sell_date_offset_days: 1,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.sell_date_offset_days < 0 {
            return Err(CoreError::Config(format!(
                "sell_date_offset_days must not be negative (got {})",
                self.sell_date_offset_days
            )));
        }
        Ok(())
    }

    /// Sell date used when the caller does not pass one explicitly.
    pub fn default_sell_date(&self, today: chrono::NaiveDate) -> chrono::NaiveDate {
        today - chrono::Duration::days(self.sell_date_offset_days)
    }
}
