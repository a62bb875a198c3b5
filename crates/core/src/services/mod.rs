pub mod portfolio_aggregator;
pub mod portfolio_reader;
pub mod report_writer;
pub mod row_evaluator;
pub mod run_driver;
pub mod ticker_tracker;
