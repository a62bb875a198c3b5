use chrono::NaiveDate;
use std::io::Write;

use crate::errors::CoreError;
use crate::models::report::{Performance, PortfolioSummary, RowOutcome, RowResult, RANKING_SIZE};
use super::report_writer::ReportWriter;

/// Folds per-row outcomes of one portfolio file into totals and rankings.
///
/// Rows must be recorded in file order. A failed row contributes its error
/// line to the report and nothing to the totals.
#[derive(Debug)]
pub struct PortfolioAggregator {
    sell_date: NaiveDate,
    stock_count: usize,
    total_invested_eur: f64,
    total_invested_usd: f64,
    total_profit_usd: f64,
    total_pct_change: f64,
    usd_eur_rate_on_sell_date: f64,
    performances: Vec<Performance>,
    last_row_buy_date_used_for_duration: Option<NaiveDate>,
}

impl PortfolioAggregator {
    pub fn new(sell_date: NaiveDate) -> Self {
        Self {
            sell_date,
            stock_count: 0,
            total_invested_eur: 0.0,
            total_invested_usd: 0.0,
            total_profit_usd: 0.0,
            total_pct_change: 0.0,
            usd_eur_rate_on_sell_date: 0.0,
            performances: Vec::new(),
            last_row_buy_date_used_for_duration: None,
        }
    }

    /// Record one row: its line goes to `writer`, a success goes into the
    /// totals. Only writer I/O errors are returned.
    pub fn record<W: Write>(
        &mut self,
        outcome: RowOutcome,
        writer: &mut ReportWriter<W>,
    ) -> Result<(), CoreError> {
        if let Some(buy_date) = outcome.buy_date {
            self.last_row_buy_date_used_for_duration = Some(buy_date);
        }

        match outcome.result {
            Ok(result) => {
                writer.write_row(&result)?;
                self.add(&result);
            }
            Err(e) => writer.emit(&e.to_string())?,
        }
        Ok(())
    }

    /// Fold a successful row into the totals.
    pub fn add(&mut self, result: &RowResult) {
        self.stock_count += 1;
        self.total_invested_eur += result.invested_eur;
        self.total_invested_usd += result.invested_usd;
        self.total_profit_usd += result.profit_usd;
        self.total_pct_change += result.pct_change;
        self.usd_eur_rate_on_sell_date = result.usd_eur_rate_on_sell_date;
        self.performances.push(Performance {
            ticker_id: result.ticker_id.clone(),
            pct_change: result.pct_change,
        });
    }

    pub fn stock_count(&self) -> usize {
        self.stock_count
    }

    /// Sort and rank. `best` and `worst` come from the same descending list and
    /// overlap when there are `RANKING_SIZE` rows or fewer.
    pub fn finalize(self) -> PortfolioSummary {
        let mut performances = self.performances;
        // Vec::sort_by is stable: ties keep file order.
        performances.sort_by(|a, b| {
            b.pct_change
                .partial_cmp(&a.pct_change)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let best = performances.iter().take(RANKING_SIZE).cloned().collect();
        let worst = performances[performances.len().saturating_sub(RANKING_SIZE)..].to_vec();

        PortfolioSummary {
            sell_date: self.sell_date,
            stock_count: self.stock_count,
            total_invested_eur: self.total_invested_eur,
            total_invested_usd: self.total_invested_usd,
            total_profit_usd: self.total_profit_usd,
            total_pct_change: self.total_pct_change,
            usd_eur_rate_on_sell_date: self.usd_eur_rate_on_sell_date,
            performances,
            best,
            worst,
            last_row_buy_date_used_for_duration: self.last_row_buy_date_used_for_duration,
        }
    }
}
