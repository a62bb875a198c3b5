use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use stock_report_core::errors::CoreError;
use stock_report_core::models::ticker::TickerMetadata;
use stock_report_core::providers::frankfurter::FrankfurterProvider;
use stock_report_core::providers::market_data::MarketDataProvider;
use stock_report_core::providers::traits::{PriceProvider, QuoteProvider};
use stock_report_core::services::report_writer::report_path_for;
use stock_report_core::StockReporter;

// ═══════════════════════════════════════════════════════════════════
// Mock Price Provider (for testing without real API calls)
// ═══════════════════════════════════════════════════════════════════

struct MockPriceProvider {
    closes: HashMap<(String, String), f64>,
    eur_usd: HashMap<String, f64>,
    metadata: HashMap<String, TickerMetadata>,
}

impl MockPriceProvider {
    fn new() -> Self {
        let mut closes = HashMap::new();
        closes.insert(("AAPL".into(), "2023-01-03".into()), 125.0);
        closes.insert(("AAPL".into(), "2023-06-01".into()), 180.0);
        closes.insert(("MSFT".into(), "2023-01-03".into()), 240.0);
        closes.insert(("MSFT".into(), "2023-06-01".into()), 336.0);
        closes.insert(("NVDA".into(), "2023-02-01".into()), 200.0);
        closes.insert(("NVDA".into(), "2023-06-01".into()), 400.0);

        let mut eur_usd = HashMap::new();
        eur_usd.insert("2023-01-03".into(), 1.25);
        eur_usd.insert("2023-02-01".into(), 1.25);
        eur_usd.insert("2023-06-01".into(), 1.25);

        let mut metadata = HashMap::new();
        metadata.insert("AAPL".into(), TickerMetadata::new("Apple Inc.", "USD"));
        metadata.insert(
            "MSFT".into(),
            TickerMetadata::new("Microsoft Corporation", "USD"),
        );
        metadata.insert("NVDA".into(), TickerMetadata::new("NVIDIA Corporation", "USD"));
        metadata.insert("SAP.DE".into(), TickerMetadata::new("SAP SE", "EUR"));

        Self {
            closes,
            eur_usd,
            metadata,
        }
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn get_closing_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError> {
        let key = (symbol.to_string(), date.format("%Y-%m-%d").to_string());
        self.closes
            .get(&key)
            .copied()
            .ok_or(CoreError::DataUnavailable {
                symbol: symbol.into(),
                date: date.to_string(),
            })
    }

    async fn get_eur_usd_rate(&self, date: NaiveDate) -> Result<f64, CoreError> {
        self.eur_usd
            .get(&date.format("%Y-%m-%d").to_string())
            .copied()
            .ok_or(CoreError::DataUnavailable {
                symbol: "EUR/USD".into(),
                date: date.to_string(),
            })
    }

    async fn get_metadata(&self, symbol: &str) -> Result<TickerMetadata, CoreError> {
        self.metadata.get(symbol).cloned().ok_or(CoreError::Api {
            provider: "MockProvider".into(),
            message: format!("unknown symbol {symbol}"),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn sell_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
}

fn reporter() -> StockReporter {
    StockReporter::new(Box::new(MockPriceProvider::new()))
}

/// Write a portfolio file at `<root>/stocks/<name>.csv`.
fn portfolio(root: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let dir = root.join("stocks");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.csv"));
    let mut text = String::from("# generated by test\nticker_id;buy_date;investment_eur\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn report_text(portfolio_path: &Path) -> String {
    std::fs::read_to_string(report_path_for(portfolio_path, sell_date())).unwrap()
}

const TWO_STOCK_REPORT: &str = "\
Ticker: AAPL, Company: \"Apple Inc.\", Currency: USD, euro_to_usd_rate_on_buy_date: 1.25, buy_stock_price: 125.00, sell_stock_price: 180.00, Increased Percentage: 44%, Profit: 550$
Ticker: MSFT, Company: \"Microsoft Corporation\", Currency: USD, euro_to_usd_rate_on_buy_date: 1.25, buy_stock_price: 240.00, sell_stock_price: 336.00, Increased Percentage: 40%, Profit: 250$

Total number of stocks: 2
Best performers: AAPL(+44.0%), MSFT(+40.0%)
Worst performers: AAPL(+44.0%), MSFT(+40.0%)
Total invested: 1875$ (1500€)
Total average percentage: 42.00%
Total Investments today: 2675$ (2140€)

Total profit in 149 days: 800$ (640€)
";

// ═══════════════════════════════════════════════════════════════════
// End-to-end
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn two_stock_portfolio_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = portfolio(
        dir.path(),
        "tech",
        &["AAPL;2023-01-03;1000", "MSFT;2023-01-03;500"],
    );

    let summary = reporter()
        .process_portfolio_file(&path, sell_date())
        .await
        .unwrap();

    assert_eq!(summary.stock_count, 2);
    assert_eq!(summary.total_invested_eur, 1500.0);
    assert_eq!(summary.total_invested_usd, 1875.0);
    assert_eq!(report_text(&path), TWO_STOCK_REPORT);
    assert!(dir
        .path()
        .join("reports/tech/investment-report-2023-06-01.txt")
        .exists());
}

#[tokio::test]
async fn same_input_produces_identical_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = portfolio(
        dir.path(),
        "tech",
        &["AAPL;2023-01-03;1000", "MSFT;2023-01-03;500"],
    );

    reporter()
        .process_portfolio_file(&path, sell_date())
        .await
        .unwrap();
    let first = std::fs::read(report_path_for(&path, sell_date())).unwrap();

    reporter()
        .process_portfolio_file(&path, sell_date())
        .await
        .unwrap();
    let second = std::fs::read(report_path_for(&path, sell_date())).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn bad_rows_are_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = portfolio(
        dir.path(),
        "mixed",
        &[
            "AAPL;2023-01-03;1000",
            "MSFT;2023-01-03;",
            "NVDA;2023-02-01;abc",
            "SAP.DE;2023-01-03;300",
            "AAPL;2023-01-03;10",
        ],
    );

    let summary = reporter()
        .process_portfolio_file(&path, sell_date())
        .await
        .unwrap();
    assert_eq!(summary.stock_count, 1);
    assert_eq!(summary.total_invested_eur, 1000.0);

    let text = report_text(&path);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Ticker: AAPL,"));
    assert_eq!(lines[1], "Missing investment_eur for ticker MSFT in row 1.");
    assert_eq!(
        lines[2],
        "Invalid investment_eur 'abc' for ticker NVDA in row 2, expected a positive number."
    );
    assert_eq!(
        lines[3],
        "Unsupported currency EUR for ticker SAP.DE. Only USD is supported."
    );
    assert_eq!(lines[4], "Duplicate keys found: AAPL");
    assert_eq!(lines[6], "Total number of stocks: 1");
    // Holding period comes from the last row whose buy date was read (SAP.DE).
    assert_eq!(lines.last().copied(), Some("Total profit in 149 days: 550$ (440€)"));
}

#[tokio::test]
async fn duplicate_across_files_only_affects_second_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = portfolio(
        dir.path(),
        "tech",
        &["AAPL;2023-01-03;1000", "MSFT;2023-01-03;500"],
    );
    let second = portfolio(
        dir.path(),
        "growth",
        &["NVDA;2023-02-01;500", "AAPL;2023-01-03;100"],
    );

    let mut reporter = reporter();
    let run = reporter
        .run(&[first.clone(), second.clone()], sell_date())
        .await;

    assert!(run.is_clean());
    assert_eq!(run.succeeded, vec![first.clone(), second.clone()]);
    assert_eq!(report_text(&first), TWO_STOCK_REPORT);

    let text = report_text(&second);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Ticker: NVDA,"));
    assert_eq!(lines[1], "Duplicate keys found: AAPL");
    assert_eq!(lines[3], "Total number of stocks: 1");
    // The duplicate row fails before its buy date is read, so NVDA's counts.
    assert_eq!(lines.last().copied(), Some("Total profit in 120 days: 625$ (500€)"));

    assert_eq!(
        reporter.tickers().keys(),
        &["AAPL".to_string(), "MSFT".to_string(), "NVDA".to_string()]
    );
}

#[tokio::test]
async fn portfolio_without_successful_rows_fails_but_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let broken = portfolio(dir.path(), "euro", &["SAP.DE;2023-01-03;300"]);
    let good = portfolio(
        dir.path(),
        "tech",
        &["AAPL;2023-01-03;1000", "MSFT;2023-01-03;500"],
    );

    let run = reporter().run(&[broken.clone(), good.clone()], sell_date()).await;

    assert_eq!(run.succeeded, vec![good.clone()]);
    assert_eq!(run.failed.len(), 1);
    assert_eq!(run.failed[0].0, broken);
    assert!(matches!(run.failed[0].1, CoreError::NoSuccessfulRows));

    assert_eq!(
        report_text(&broken),
        "Unsupported currency EUR for ticker SAP.DE. Only USD is supported.\n\
         \n\
         Total number of stocks: 0\n\
         Best performers: \n\
         Worst performers: \n\
         Total invested: 0$ (0€)\n"
    );
    assert_eq!(report_text(&good), TWO_STOCK_REPORT);
}

#[tokio::test]
async fn malformed_file_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let stocks = dir.path().join("stocks");
    std::fs::create_dir_all(&stocks).unwrap();
    let malformed = stocks.join("bad.csv");
    std::fs::write(&malformed, "symbol;date;amount\nAAPL;2023-01-03;1000\n").unwrap();
    let good = portfolio(dir.path(), "tech", &["MSFT;2023-01-03;500"]);

    let run = reporter().run(&[malformed.clone(), good.clone()], sell_date()).await;

    assert_eq!(run.succeeded, vec![good]);
    assert!(matches!(run.failed[0].1, CoreError::InvalidFileFormat(_)));
    assert!(!report_path_for(&malformed, sell_date()).exists());
}

#[tokio::test]
async fn weekend_sell_date_fails_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = portfolio(dir.path(), "tech", &["AAPL;2023-01-03;1000"]);
    let saturday = NaiveDate::from_ymd_opt(2023, 6, 3).unwrap();

    let err = reporter()
        .process_portfolio_file(&path, saturday)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoSuccessfulRows));

    let text = std::fs::read_to_string(report_path_for(&path, saturday)).unwrap();
    assert!(text.starts_with("No trading data available for EUR/USD on 2023-06-03\n"));
}

/// Quote source backed by the mock's prices and metadata.
struct AppleQuotes;

#[async_trait]
impl QuoteProvider for AppleQuotes {
    fn name(&self) -> &str {
        "AppleQuotes"
    }

    async fn get_closing_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError> {
        MockPriceProvider::new().get_closing_price(symbol, date).await
    }

    async fn get_metadata(&self, symbol: &str) -> Result<TickerMetadata, CoreError> {
        MockPriceProvider::new().get_metadata(symbol).await
    }
}

#[tokio::test]
async fn unreachable_fx_source_becomes_report_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = portfolio(dir.path(), "tech", &["AAPL;2023-01-03;1000"]);
    let provider = MarketDataProvider::new(
        Box::new(AppleQuotes),
        Box::new(FrankfurterProvider::with_base_url("http://127.0.0.1:9")),
    );

    let err = StockReporter::new(Box::new(provider))
        .process_portfolio_file(&path, sell_date())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoSuccessfulRows));

    let text = report_text(&path);
    assert_eq!(
        text.lines().next(),
        Some("No trading data available for EUR/USD on 2023-01-03")
    );
}
