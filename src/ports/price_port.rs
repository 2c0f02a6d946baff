//! Historical price lookup port trait.

use crate::domain::error::CorpusError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait PricePort {
    /// Closing prices for `ticker` with dates in `[start_date, end_date]`.
    ///
    /// A ticker the source knows nothing about is an error; a known ticker
    /// with no sessions in range yields an empty series.
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, CorpusError>;

    fn list_tickers(&self) -> Result<Vec<String>, CorpusError>;

    /// First date, last date and number of points held for `ticker`.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CorpusError>;
}
