use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::portfolio::{
    non_empty, RawPortfolioRow, BUY_DATE_COLUMN, INVESTMENT_EUR_COLUMN, TICKER_ID_COLUMN,
};

/// Reads semicolon-delimited portfolio files.
///
/// ```text
/// # my tech stocks
/// ticker_id;buy_date;investment_eur
/// AAPL;2023-01-03;1000
/// ```
///
/// Lines starting with `#` are skipped. The header must name all three
/// columns (in any order; extra columns are ignored). Field contents are not
/// validated here.
pub struct PortfolioReader;

struct ColumnIndex {
    ticker_id: usize,
    buy_date: usize,
    investment_eur: usize,
}

impl PortfolioReader {
    pub fn read_file(path: &Path) -> Result<Vec<RawPortfolioRow>, CoreError> {
        let file = std::fs::File::open(path)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", path.display())))?;
        Self::read(file)
    }

    pub fn read<R: Read>(input: R) -> Result<Vec<RawPortfolioRow>, CoreError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .comment(Some(b'#'))
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let columns = Self::columns(rdr.headers()?)?;

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            // Lines made only of delimiters carry no data.
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            rows.push(Self::row(rows.len(), &record, &columns));
        }
        Ok(rows)
    }

    fn columns(headers: &StringRecord) -> Result<ColumnIndex, CoreError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    CoreError::InvalidFileFormat(format!("missing header column '{name}'"))
                })
        };
        Ok(ColumnIndex {
            ticker_id: find(TICKER_ID_COLUMN)?,
            buy_date: find(BUY_DATE_COLUMN)?,
            investment_eur: find(INVESTMENT_EUR_COLUMN)?,
        })
    }

    fn row(index: usize, record: &StringRecord, columns: &ColumnIndex) -> RawPortfolioRow {
        let field = |i: usize| record.get(i).map(str::to_string).and_then(non_empty);
        RawPortfolioRow {
            index,
            ticker_id: field(columns.ticker_id),
            buy_date: field(columns.buy_date),
            investment_eur: field(columns.investment_eur),
        }
    }
}
