use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

/// Unified error type for the entire stock-report-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// The row-level variants display as the bare message so they can be written
/// into a report verbatim.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Row level ───────────────────────────────────────────────────
    #[error("{0}")]
    ValidationError(String),

    #[error("No trading data available for {symbol} on {date}")]
    DataUnavailable { symbol: String, date: String },

    #[error("Unsupported currency {currency} for ticker {ticker}. Only USD is supported.")]
    UnsupportedCurrency { ticker: String, currency: String },

    #[error("Duplicate keys found: {0}")]
    DuplicateKey(String),

    // ── Portfolio level ─────────────────────────────────────────────
    #[error("No stock could be evaluated, the average percentage is undefined")]
    NoSuccessfulRows,

    #[error("Invalid portfolio file: {0}")]
    InvalidFileFormat(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    // ── Settings ────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Whether this error is confined to a single portfolio row. Row-level
    /// errors become a report line; everything else aborts the portfolio file.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            CoreError::ValidationError(_)
                | CoreError::DataUnavailable { .. }
                | CoreError::UnsupportedCurrency { .. }
                | CoreError::DuplicateKey(_)
        )
    }

    /// Report a failed provider lookup as missing data for `symbol` on
    /// `date`. `Api`, `Network` and `DataUnavailable` are folded into
    /// `DataUnavailable`; any other error is returned unchanged.
    pub fn into_unavailable(self, symbol: &str, date: NaiveDate) -> CoreError {
        match self {
            CoreError::Api { .. } | CoreError::Network(_) | CoreError::DataUnavailable { .. } => {
                debug!(%symbol, %date, error = %self, "provider lookup failed");
                CoreError::DataUnavailable {
                    symbol: symbol.to_string(),
                    date: date.to_string(),
                }
            }
            other => other,
        }
    }
}

/// Replace the query string of any URL in `msg` with `<query redacted>`,
/// keeping whatever follows the URL.
pub(crate) fn redact_query(msg: &str) -> String {
    let mut out = String::with_capacity(msg.len());
    let mut rest = msg;
    while let Some(start) = rest.find('?') {
        out.push_str(&rest[..start]);
        out.push_str("?<query redacted>");
        let tail = &rest[start + 1..];
        let end = tail
            .find(|c: char| c.is_whitespace() || matches!(c, ')' | '>' | '"' | '\''))
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Io(_) => CoreError::FileIO(e.to_string()),
            _ => CoreError::InvalidFileFormat(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; keep the query string out of logs.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_keeps_text_after_the_url() {
        let msg = "error sending request for url (http://127.0.0.1:9/2023-01-03?base=EUR&symbols=USD)";
        assert_eq!(
            redact_query(msg),
            "error sending request for url (http://127.0.0.1:9/2023-01-03?<query redacted>)"
        );
    }

    #[test]
    fn redaction_without_query_is_identity() {
        let msg = "error sending request for url (http://127.0.0.1:9/latest)";
        assert_eq!(redact_query(msg), msg);
    }

    #[test]
    fn redaction_at_end_of_message() {
        assert_eq!(
            redact_query("GET https://host/x?token=abc"),
            "GET https://host/x?<query redacted>"
        );
    }
}
