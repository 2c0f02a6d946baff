//! CSV price directory adapter: one `<TICKER>.csv` per ticker.
//!
//! Files need a header with a `date` column (`YYYY-MM-DD`) and a `close`
//! column; other columns, such as open/high/low/volume, are ignored.

use crate::domain::error::CorpusError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// Every point in the ticker's file.
    pub fn read_all(&self, ticker: &str) -> Result<Vec<PricePoint>, CorpusError> {
        let path = self.csv_path(ticker);
        if !path.is_file() {
            return Err(CorpusError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| CorpusError::Database {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let headers = rdr.headers().map_err(|e| CorpusError::Database {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let column = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let date_col = column(&["date"]).ok_or_else(|| CorpusError::Database {
            reason: format!("missing date column in {}", path.display()),
        })?;
        let close_col = column(&["close"])
            .or_else(|| column(&["adj close", "adj_close"]))
            .ok_or_else(|| CorpusError::Database {
                reason: format!("missing close column in {}", path.display()),
            })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| CorpusError::Database {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                CorpusError::Database {
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;

            let close: f64 = record
                .get(close_col)
                .unwrap_or_default()
                .trim()
                .parse()
                .map_err(|e| CorpusError::Database {
                    reason: format!("invalid close value on {}: {}", date, e),
                })?;

            points.push(PricePoint::new(date, close));
        }

        Ok(points)
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, CorpusError> {
        let points = self
            .read_all(ticker)?
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect();
        Ok(PriceSeries::new(ticker, points))
    }

    fn list_tickers(&self) -> Result<Vec<String>, CorpusError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| CorpusError::Database {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CorpusError::Database {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CorpusError> {
        let series = match self.read_all(ticker) {
            Ok(points) => PriceSeries::new(ticker, points),
            Err(CorpusError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => Ok(Some((first, last, series.len()))),
            _ => Ok(None),
        }
    }
}
