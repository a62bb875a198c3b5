pub mod market_data;
pub mod traits;

// API provider implementations
pub mod frankfurter;
pub mod yahoo_finance;
