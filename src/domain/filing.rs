//! Filing identity and corpus records.
//!
//! Filings are discovered by file name: `<TICKER>-<YYYY-MM-DD>-8-K.txt`.

use crate::domain::label::Label;
use chrono::NaiveDate;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\w+)-(\d{4}-\d{2}-\d{2})-8-K\.txt$").expect("valid filing name pattern")
});

/// A filing located by the ingestion side; text is read on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRef {
    pub id: String,
    pub ticker: String,
    pub filing_date: NaiveDate,
    pub path: PathBuf,
}

impl FilingRef {
    /// Name of this filing's entry in the corpus.
    pub fn record_name(&self) -> String {
        record_name(&self.ticker, self.filing_date)
    }
}

pub fn record_name(ticker: &str, filing_date: NaiveDate) -> String {
    format!("{}-{}.txt", ticker, filing_date.format("%Y-%m-%d"))
}

/// Parses `<TICKER>-<date>-8-K.txt` into (ticker, date). Tickers are upper-cased.
pub fn parse_filing_filename(name: &str) -> Option<(String, NaiveDate)> {
    let caps = FILENAME_PATTERN.captures(name)?;
    let ticker = caps.get(1)?.as_str().to_uppercase();
    let date = NaiveDate::parse_from_str(caps.get(2)?.as_str(), "%Y-%m-%d").ok()?;
    Some((ticker, date))
}

/// A labeled filing ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusRecord {
    pub filing_id: String,
    pub ticker: String,
    pub filing_date: NaiveDate,
    pub label: Label,
    pub raw_text: String,
}

impl CorpusRecord {
    pub fn record_name(&self) -> String {
        record_name(&self.ticker, self.filing_date)
    }
}

/// Case-insensitive substring test used by the keyword filter.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}
